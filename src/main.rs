//! Rental Server: car rental booking API.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use rental_core::config::AppConfig;
use rental_core::error::AppError;
use rental_database::{DatabasePool, PgBookingStore};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `RENTAL_ENV`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("RENTAL_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting rental server");

    let db = DatabasePool::connect(&config.database).await?;
    if config.database.run_migrations {
        rental_database::migration::run_migrations(db.pool()).await?;
    }

    let store = Arc::new(PgBookingStore::new(db.pool().clone()));
    let result = rental_api::run_server(config, store).await;

    db.close().await;
    result
}
