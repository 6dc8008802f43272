//! Simtemp - Main Entry Point

use anyhow::{anyhow, Context};
use api::settings::Settings;
use api::{init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    init_logging(&settings.logging).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("=== Simtemp v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Device properties: {:?}", settings.device);

    run_server(settings)
        .await
        .map_err(|e| anyhow!("Server error: {}", e))?;

    Ok(())
}
