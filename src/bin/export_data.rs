// src/bin/export_data.rs
use anyhow::{bail, Context};
use credit_dashboard::config::DashboardConfig;
use credit_dashboard::models::ExportFormat;
use credit_dashboard::services::ApiClient;
use credit_dashboard::store::Store;
use log::info;
use std::env;
use std::sync::Arc;

/// Usage: export_data <json|csv|excel> <output path>
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <json|csv|excel> <output path>", args[0]);
    }
    let format: ExportFormat = args[1].parse().map_err(anyhow::Error::msg)?;
    let output = &args[2];

    let config = DashboardConfig::from_env()?;
    let store = Store::from_config(Arc::new(ApiClient::from_config(&config)?), &config);

    let Some(bytes) = store.export_data(format).await else {
        bail!("export failed: {}", store.reports().error.unwrap_or_default());
    };
    std::fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output))?;
    info!("Wrote {} bytes to {}", bytes.len(), output);
    println!("Export complete!");
    Ok(())
}
