//! Declarative route table.
//!
//! Each entry names a business endpoint and the trust level it needs. The
//! composer turns the `Access` value into the ordered stage list, so a route's
//! protection is read off this table and nowhere else.

use axum::routing::MethodFilter;

pub const ADMIN: &str = "admin";
pub const CUSTOMER: &str = "customer";

const ADMIN_ONLY: &[&str] = &[ADMIN];
const ADMIN_OR_CUSTOMER: &[&str] = &[ADMIN, CUSTOMER];

/// Who may reach a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Rate limited only.
    Public,
    /// Signed by a trusted internal service.
    Service,
    /// Signed by a service, and the forwarded user (if any) holds one of the roles.
    ServiceWithRoles(&'static [&'static str]),
    /// Signed by a service on behalf of a user with a bearer token and one of the roles.
    User(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub name: &'static str,
    pub method: MethodFilter,
    pub path: &'static str,
    pub access: Access,
}

const fn route(
    name: &'static str,
    method: MethodFilter,
    path: &'static str,
    access: Access,
) -> RouteSpec {
    RouteSpec {
        name,
        method,
        path,
        access,
    }
}

pub const HEALTH: &str = "health";

pub const ROUTES: &[RouteSpec] = &[
    route(HEALTH, MethodFilter::GET, "/health", Access::Public),
    // Fields
    route("field.list", MethodFilter::GET, "/api/v1/field", Access::User(ADMIN_OR_CUSTOMER)),
    route(
        "field.list_all",
        MethodFilter::GET,
        "/api/v1/field/pagination",
        Access::User(ADMIN_OR_CUSTOMER),
    ),
    route("field.get", MethodFilter::GET, "/api/v1/field/{uuid}", Access::User(ADMIN_OR_CUSTOMER)),
    route("field.create", MethodFilter::POST, "/api/v1/field", Access::User(ADMIN_ONLY)),
    route("field.update", MethodFilter::PUT, "/api/v1/field/{uuid}", Access::User(ADMIN_ONLY)),
    route("field.delete", MethodFilter::DELETE, "/api/v1/field/{uuid}", Access::User(ADMIN_ONLY)),
    // Field schedules
    route(
        "field_schedule.list_by_field",
        MethodFilter::GET,
        "/api/v1/field/schedule/lists/{uuid}",
        Access::Service,
    ),
    route(
        "field_schedule.update_status",
        MethodFilter::PATCH,
        "/api/v1/field/schedule",
        Access::Service,
    ),
    route(
        "field_schedule.list",
        MethodFilter::GET,
        "/api/v1/field/schedule/pagination",
        Access::User(ADMIN_OR_CUSTOMER),
    ),
    route(
        "field_schedule.get",
        MethodFilter::GET,
        "/api/v1/field/schedule/{uuid}",
        Access::User(ADMIN_OR_CUSTOMER),
    ),
    route(
        "field_schedule.create",
        MethodFilter::POST,
        "/api/v1/field/schedule",
        Access::User(ADMIN_ONLY),
    ),
    route(
        "field_schedule.generate",
        MethodFilter::POST,
        "/api/v1/field/schedule/one-month",
        Access::User(ADMIN_ONLY),
    ),
    route(
        "field_schedule.update",
        MethodFilter::PUT,
        "/api/v1/field/schedule/{uuid}",
        Access::User(ADMIN_ONLY),
    ),
    route(
        "field_schedule.delete",
        MethodFilter::DELETE,
        "/api/v1/field/schedule/{uuid}",
        Access::User(ADMIN_ONLY),
    ),
    // Time slots
    route("time.list", MethodFilter::GET, "/api/v1/time", Access::User(ADMIN_ONLY)),
    route("time.get", MethodFilter::GET, "/api/v1/time/{uuid}", Access::User(ADMIN_ONLY)),
    route("time.create", MethodFilter::POST, "/api/v1/time", Access::User(ADMIN_ONLY)),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_route_names_unique() {
        let names: HashSet<_> = ROUTES.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), ROUTES.len());
    }

    #[test]
    fn test_only_health_is_public() {
        let public: Vec<_> = ROUTES
            .iter()
            .filter(|r| r.access == Access::Public)
            .map(|r| r.name)
            .collect();
        assert_eq!(public, vec![HEALTH]);
    }

    #[test]
    fn test_writes_are_admin_only() {
        for spec in ROUTES {
            let is_write = [MethodFilter::POST, MethodFilter::PUT, MethodFilter::DELETE]
                .contains(&spec.method);
            if is_write {
                assert_eq!(spec.access, Access::User(ADMIN_ONLY), "route {}", spec.name);
            }
        }
    }

    #[test]
    fn test_api_routes_require_signature() {
        for spec in ROUTES.iter().filter(|r| r.path.starts_with("/api/")) {
            assert_ne!(spec.access, Access::Public, "route {}", spec.name);
        }
    }

    #[test]
    fn test_service_routes() {
        let service: Vec<_> = ROUTES
            .iter()
            .filter(|r| r.access == Access::Service)
            .map(|r| r.name)
            .collect();
        assert_eq!(
            service,
            vec!["field_schedule.list_by_field", "field_schedule.update_status"]
        );
    }
}
