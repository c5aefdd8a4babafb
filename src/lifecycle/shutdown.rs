//! Shutdown coordination.
//!
//! One `Shutdown` per process. The signal listener triggers it and the HTTP
//! server drains on a `ShutdownSignal` obtained from it. The stop state is
//! latched, so a signal taken after the trigger still resolves immediately.

use std::sync::Arc;

use tokio::sync::watch;

/// Process-wide stop switch.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A future-producing handle for one task that must stop on shutdown.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Flip the switch. Idempotent.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once the owning `Shutdown` is triggered.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub async fn wait(mut self) {
        // Sender gone without a trigger: nobody can stop us any more.
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_trigger_reaches_every_signal() {
        let shutdown = Shutdown::new();
        let a = shutdown.signal();
        let b = shutdown.signal();

        shutdown.trigger();
        timeout(Duration::from_secs(1), a.wait()).await.unwrap();
        timeout(Duration::from_secs(1), b.wait()).await.unwrap();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_signal_taken_after_trigger_resolves() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();

        timeout(Duration::from_secs(1), shutdown.signal().wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_untriggered_signal_stays_pending() {
        let shutdown = Shutdown::default();
        let waited = timeout(Duration::from_millis(50), shutdown.signal().wait()).await;
        assert!(waited.is_err());
        assert!(!shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let shutdown = Shutdown::new();
        let signal = shutdown.signal();
        shutdown.clone().trigger();
        timeout(Duration::from_secs(1), signal.wait()).await.unwrap();
    }
}
