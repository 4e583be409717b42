// src/services/mod.rs
pub mod api;
pub mod gateway;

pub use api::ApiClient;
pub use gateway::PortfolioGateway;
