//! plate-gateway server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket relay and admin REST
//! endpoints.

use tracing_subscriber::EnvFilter;

use plate_gateway::config::{GatewayConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; a bad config is still reported through tracing
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(LogFormat::default());
            tracing::error!(error = %err, "invalid configuration");
            return Err(err.into());
        }
    };

    // Initialize tracing
    init_tracing(config.log_format);

    tracing::info!(
        addr = %config.listen_addr,
        artifact_dir = %config.artifact_dir.display(),
        match_mode = %config.plate_match_mode,
        "starting plate-gateway"
    );

    plate_gateway::server::run(config).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
