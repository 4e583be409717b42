use anyhow::Context;
use credit_dashboard::config::DashboardConfig;
use credit_dashboard::orchestrator::VersionSync;
use credit_dashboard::routes;
use credit_dashboard::services::ApiClient;
use credit_dashboard::store::Store;
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the dashboard...");

    let config = DashboardConfig::from_env()?;
    let client = ApiClient::from_config(&config).context("Failed to build API client")?;
    let store = Arc::new(Store::from_config(Arc::new(client), &config));

    // Follow the active version before the first versions fetch lands
    let _version_sync = VersionSync::spawn(store.clone());

    let (data, versions) = tokio::join!(store.fetch_portfolio_data(), store.fetch_versions());
    info!("Initial load: portfolio {:?}, versions {:?}", data, versions);
    if let Some(err) = store.portfolio().error {
        warn!("Portfolio data unavailable at startup: {}", err);
    }

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"]);

    let api = routes::routes(store).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
