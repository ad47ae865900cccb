pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod registration;
pub mod services;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(database = %config.database_url, "starting tourney");
    if let Err(e) = api::server::start_server(config).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
