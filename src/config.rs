// src/config.rs
use anyhow::{Context, Result};
use log::{info, warn};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_PORT: u16 = 3030;

/// Every gateway request is bounded by this timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub port: u16,
    /// Discard folds from dispatches older than the last applied one.
    pub stale_guard: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            port: DEFAULT_PORT,
            stale_guard: true,
        }
    }
}

impl DashboardConfig {
    /// Reads `API_URL`, `PORT` and `STALE_GUARD`, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = DashboardConfig::default();

        match env::var("API_URL") {
            Ok(url) if !url.trim().is_empty() => config.api_base_url = url,
            _ => warn!("$API_URL not set, defaulting to {}", DEFAULT_API_URL),
        }

        if let Ok(port) = env::var("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("PORT must be a number, got {:?}", port))?;
        }

        if let Ok(flag) = env::var("STALE_GUARD") {
            config.stale_guard = parse_flag(&flag)
                .with_context(|| format!("STALE_GUARD must be true or false, got {:?}", flag))?;
        }

        info!(
            "Configuration: api={} port={} stale_guard={}",
            config.api_base_url, config.port, config.stale_guard
        );
        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
