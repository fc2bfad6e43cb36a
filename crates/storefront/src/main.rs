use anyhow::{Context, Result};
use dotenv::dotenv;
use shared::{
    config::Config,
    utils::{Telemetry, init_logger},
};
use storefront::{handler::AppRouter, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let is_dev = std::env::var("DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let is_enable_file = std::env::var("ENABLE_FILE_LOG")
        .map(|v| v == "true")
        .unwrap_or(false);

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = match &config.otel_endpoint {
        Some(endpoint) => {
            let mut telemetry = Telemetry::new("storefront", endpoint.clone());
            telemetry
                .init()
                .context("Failed to initialize OpenTelemetry exporters")?;
            Some(telemetry)
        }
        None => None,
    };

    init_logger(
        telemetry.as_ref().and_then(Telemetry::logger_provider),
        "storefront",
        is_dev,
        is_enable_file,
    );

    let state = AppState::new(&config)
        .await
        .context("Failed to create AppState")?;

    info!("🚀 Server started successfully");

    AppRouter::serve(config.port, state)
        .await
        .context("Failed to start server")?;

    info!("Shutting down servers...");

    if let Some(telemetry) = telemetry {
        telemetry.shutdown()?;
    }

    Ok(())
}
