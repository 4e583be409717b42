// src/bin/check_api.rs
use credit_dashboard::config::DashboardConfig;
use credit_dashboard::models::VersionStatus;
use credit_dashboard::services::{ApiClient, PortfolioGateway};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = DashboardConfig::from_env()?;
    let client = ApiClient::from_config(&config)?;

    info!("Checking API at {}", config.api_base_url);

    let data = client.get_portfolio_data().await?;
    println!(
        "Portfolio:  {} contracts, {} drawdowns, {} repayments",
        data.contracts.len(),
        data.drawdowns.len(),
        data.repayments.len()
    );

    let versions = client.list_versions().await?;
    println!("Versions:   {}", versions.len());
    for version in &versions {
        println!("  {:<24} {:?} {:?}", version.id, version.version_type, version.status);
    }

    if let Some(active) = versions.iter().find(|v| v.status == VersionStatus::Active) {
        let metrics = client.get_portfolio_metrics(&active.id).await?;
        println!(
            "Metrics ({}): utilization {:.2}%, weighted rate {:.4}",
            active.id,
            metrics.utilization_ratio * 100.0,
            metrics.weighted_average_rate
        );
        let cashflow = client.get_portfolio_cashflow(&active.id).await?;
        println!("Cashflow:   {} periods", cashflow.cashflow_items.len());
    }

    Ok(())
}
