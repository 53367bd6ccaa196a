//! Kayako - connectivity check for a Kayako helpdesk
//!
//! Verifies the configured credentials, then prints the helpdesk's
//! departments as JSON. Given a ticket identifier, prints that ticket too.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `KAYAKO_API_URL`: REST endpoint of your Kayako installation
//! - `KAYAKO_API_KEY`: API key
//! - `KAYAKO_SECRET_KEY`: Secret key used to sign requests
//!
//! # Usage
//!
//! ```bash
//! ./kayako
//! ./kayako 42
//! ```

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use kayako::models::{Department, Ticket};
use kayako::{config, Entity, KayakoClient, Lifecycle, Scope};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the JSON output
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kayako=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Kayako client v{}", env!("CARGO_PKG_VERSION"));

    let ticket_id = match std::env::args().nth(1) {
        Some(arg) => Some(
            arg.parse::<i64>()
                .with_context(|| format!("Invalid ticket id: {arg}"))?,
        ),
        None => None,
    };

    let config = config::Config::from_env().context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded, api_url: {}", config.api_url);

    let client = KayakoClient::new(&config).context("Failed to create Kayako client")?;

    tracing::info!("Testing connection to Kayako...");
    client
        .test_connection()
        .await
        .context("Connection test failed")?;

    let departments = Department::get_all(&client, Scope::new())
        .await
        .context("Failed to list departments")?;
    tracing::info!(count = departments.len(), "Listed departments");
    for department in &departments {
        println!("{}", serde_json::to_string_pretty(department.record())?);
    }

    if let Some(id) = ticket_id {
        let Some(ticket) = Ticket::get(&client, id)
            .await
            .context("Failed to fetch ticket")?
        else {
            bail!("Ticket {id} not found");
        };
        tracing::info!("Fetched {}", ticket);
        println!("{}", serde_json::to_string_pretty(ticket.record())?);
    }

    Ok(())
}
