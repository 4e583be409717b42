// src/handlers/portfolio.rs
use log::info;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::store::Store;

pub async fn get_portfolio(store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to get portfolio state");
    Ok(warp::reply::json(&store.portfolio()))
}

pub async fn refresh_portfolio(store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to refresh portfolio data");
    store.refresh_portfolio_data().await;
    Ok(warp::reply::json(&store.portfolio()))
}

pub async fn get_contract(contract_id: String, store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to load contract {}", contract_id);
    store.fetch_contract(&contract_id).await;
    Ok(warp::reply::json(&store.portfolio()))
}

pub async fn clear_error(store: Arc<Store>) -> Result<Json, Rejection> {
    store.clear_portfolio_error();
    Ok(warp::reply::json(&store.portfolio()))
}
