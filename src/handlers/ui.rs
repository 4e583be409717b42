// src/handlers/ui.rs
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::models::Notification;
use crate::store::Store;

pub async fn get_ui(store: Arc<Store>) -> Result<Json, Rejection> {
    Ok(warp::reply::json(&store.ui()))
}

pub async fn add_notification(
    notification: Notification,
    store: Arc<Store>,
) -> Result<Json, Rejection> {
    store.add_notification(notification);
    Ok(warp::reply::json(&store.ui()))
}

pub async fn dismiss_notification(id: String, store: Arc<Store>) -> Result<Json, Rejection> {
    store.dismiss_notification(&id);
    Ok(warp::reply::json(&store.ui()))
}
