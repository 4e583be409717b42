// src/handlers/versions.rs
use log::{info, warn};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::HandlerError;
use crate::models::{ScenarioDraft, VersionDraft, VersionPatch};
use crate::store::Store;

fn invalid(err: crate::error::ValidationError) -> Rejection {
    warn!("Rejected invalid request: {}", err);
    warp::reject::custom(HandlerError::from(err))
}

pub async fn get_versions(store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to get versions state");
    Ok(warp::reply::json(&store.versions()))
}

pub async fn create_version(draft: VersionDraft, store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to create version {:?}", draft.name);
    store.create_version(draft).await.map_err(invalid)?;
    Ok(warp::reply::json(&store.versions()))
}

pub async fn update_version(
    id: String,
    patch: VersionPatch,
    store: Arc<Store>,
) -> Result<Json, Rejection> {
    info!("Handling request to update version {}", id);
    store.update_version(&id, patch).await.map_err(invalid)?;
    Ok(warp::reply::json(&store.versions()))
}

pub async fn delete_version(id: String, store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to delete version {}", id);
    store.delete_version(&id).await;
    Ok(warp::reply::json(&store.versions()))
}

pub async fn activate_version(id: String, store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to activate version {}", id);
    store.activate_version(&id).await;
    Ok(warp::reply::json(&store.versions()))
}

pub async fn select_version(id: String, store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to view version {}", id);
    store.set_active_version_local(&id);
    Ok(warp::reply::json(&store.versions()))
}

pub async fn compare_versions(
    first_id: String,
    second_id: String,
    store: Arc<Store>,
) -> Result<Json, Rejection> {
    info!("Handling request to compare {} with {}", first_id, second_id);
    store.compare_versions(&first_id, &second_id).await;
    Ok(warp::reply::json(&store.versions()))
}

pub async fn create_scenario(draft: ScenarioDraft, store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to create scenario {:?}", draft.name);
    store.create_scenario(draft).await.map_err(invalid)?;
    Ok(warp::reply::json(&store.versions()))
}

pub async fn get_templates(store: Arc<Store>) -> Result<Json, Rejection> {
    info!("Handling request to get scenario templates");
    store.fetch_scenario_templates().await;
    Ok(warp::reply::json(&store.versions()))
}
