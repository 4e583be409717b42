// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod routes;
pub mod services;
pub mod store;
