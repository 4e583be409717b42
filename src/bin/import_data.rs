// src/bin/import_data.rs
use anyhow::{bail, Context};
use credit_dashboard::config::DashboardConfig;
use credit_dashboard::services::ApiClient;
use credit_dashboard::store::{Settled, Store};
use std::env;
use std::path::Path;
use std::sync::Arc;

/// Usage: import_data <file>
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let path = env::args().nth(1).context("usage: import_data <file>")?;
    let contents = std::fs::read(&path).with_context(|| format!("Failed to read {}", path))?;
    let file_name = Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("import.json")
        .to_string();

    let config = DashboardConfig::from_env()?;
    let store = Store::from_config(Arc::new(ApiClient::from_config(&config)?), &config);

    match store.import_data(&file_name, contents).await? {
        Settled::Fulfilled => {
            let summary = store.reports().last_import.unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        _ => bail!("import failed: {}", store.reports().error.unwrap_or_default()),
    }
}
