use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use field_service::security::Signature;

#[derive(Parser)]
#[command(name = "field-cli")]
#[command(about = "Operator CLI for the field service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8002")]
    url: String,

    /// Calling service name sent as X-Service-Name
    #[arg(short, long, default_value = "field-cli")]
    service_name: String,

    /// Shared signature key
    #[arg(short, long, env = "FIELD_SIGNATURE_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the signature headers for a request
    Sign {
        /// Unix timestamp to sign (defaults to now)
        #[arg(short, long)]
        timestamp: Option<String>,
    },
    /// Send a signed GET request and print the JSON envelope
    Get {
        /// Path under the base URL, e.g. /api/v1/field/pagination
        path: String,

        /// Bearer token for user routes
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sign { timestamp } => {
            let signature = match timestamp {
                Some(ts) => Signature::at(&cli.service_name, &cli.key, ts),
                None => Signature::now(&cli.service_name, &cli.key),
            };
            for (name, value) in signature.headers() {
                println!("{name}: {value}");
            }
        }
        Commands::Get { path, token } => {
            let signature = Signature::now(&cli.service_name, &cli.key);

            let mut headers = HeaderMap::new();
            for (name, value) in signature.headers() {
                headers.insert(HeaderName::from_static(name), HeaderValue::from_str(value)?);
            }
            if let Some(token) = token {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {token}"))?,
                );
            }

            let url = format!(
                "{}/{}",
                cli.url.trim_end_matches('/'),
                path.trim_start_matches('/')
            );
            let res = reqwest::Client::new().get(url).headers(headers).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: field service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
