// src/handlers/mod.rs
pub mod error;
pub mod portfolio;
pub mod reports;
pub mod ui;
pub mod versions;
