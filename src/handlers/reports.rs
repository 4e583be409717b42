// src/handlers/reports.rs
use log::{error, info};
use serde_json::Value;
use std::sync::Arc;
use warp::http::header::CONTENT_TYPE;
use warp::reply::Json;
use warp::{Rejection, Reply};

use super::error::HandlerError;
use crate::models::{ExportFormat, ReportFormat};
use crate::store::Store;

fn content_type(format: &str) -> &'static str {
    match format {
        "pdf" => "application/pdf",
        "excel" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

pub async fn generate_report(
    report_type: String,
    params: Value,
    store: Arc<Store>,
) -> Result<Json, Rejection> {
    info!("Handling request to generate {} report", report_type);
    store
        .generate_report(&report_type, params)
        .await
        .map_err(|e| warp::reject::custom(HandlerError::from(e)))?;
    Ok(warp::reply::json(&store.reports()))
}

pub async fn download_report(
    report_id: String,
    format: ReportFormat,
    store: Arc<Store>,
) -> Result<impl Reply, Rejection> {
    info!("Handling request to download report {} as {}", report_id, format);
    match store.download_report(&report_id, format).await {
        Some(bytes) => Ok(warp::reply::with_header(
            bytes,
            CONTENT_TYPE,
            content_type(format.as_str()),
        )),
        None => {
            let reason = store.reports().error;
            error!("Report download failed: {:?}", reason);
            Err(warp::reject::custom(HandlerError::upstream(reason)))
        }
    }
}

pub async fn export_data(format: ExportFormat, store: Arc<Store>) -> Result<impl Reply, Rejection> {
    info!("Handling request to export data as {}", format);
    match store.export_data(format).await {
        Some(bytes) => Ok(warp::reply::with_header(
            bytes,
            CONTENT_TYPE,
            content_type(format.as_str()),
        )),
        None => Err(warp::reject::custom(HandlerError::upstream(
            store.reports().error,
        ))),
    }
}

pub async fn get_reports(store: Arc<Store>) -> Result<Json, Rejection> {
    Ok(warp::reply::json(&store.reports()))
}
