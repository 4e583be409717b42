// src/routes.rs
use crate::handlers::error::HandlerError;
use crate::handlers::{portfolio, reports, ui, versions};
use crate::models::{ExportFormat, ReportFormat};
use crate::store::Store;
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use warp::filters::body::BodyDeserializeError;
use warp::reject::Rejection;
use warp::{Filter, Reply};

// Add recovery handling for our custom errors
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(handler_error) = err.find::<HandlerError>() {
        code = handler_error.status;
        message = handler_error.message.clone();
    } else if let Some(body_error) = err.find::<BodyDeserializeError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = body_error.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(store: Arc<Store>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let store_filter = warp::any().map(move || store.clone());

    let portfolio_route = warp::path!("api" / "v1" / "portfolio")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(portfolio::get_portfolio);

    let refresh_route = warp::path!("api" / "v1" / "portfolio" / "refresh")
        .and(warp::post())
        .and(store_filter.clone())
        .and_then(portfolio::refresh_portfolio);

    let contract_route = warp::path!("api" / "v1" / "portfolio" / "contracts" / String)
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(portfolio::get_contract);

    let portfolio_error_route = warp::path!("api" / "v1" / "portfolio" / "error")
        .and(warp::delete())
        .and(store_filter.clone())
        .and_then(portfolio::clear_error);

    let versions_route = warp::path!("api" / "v1" / "versions")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(versions::get_versions);

    let create_version_route = warp::path!("api" / "v1" / "versions")
        .and(warp::post())
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(versions::create_version);

    let update_version_route = warp::path!("api" / "v1" / "versions" / String)
        .and(warp::put())
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(versions::update_version);

    let delete_version_route = warp::path!("api" / "v1" / "versions" / String)
        .and(warp::delete())
        .and(store_filter.clone())
        .and_then(versions::delete_version);

    let activate_route = warp::path!("api" / "v1" / "versions" / String / "activate")
        .and(warp::post())
        .and(store_filter.clone())
        .and_then(versions::activate_version);

    let select_route = warp::path!("api" / "v1" / "versions" / String / "select")
        .and(warp::post())
        .and(store_filter.clone())
        .and_then(versions::select_version);

    let compare_route = warp::path!("api" / "v1" / "versions" / "compare" / String / String)
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(versions::compare_versions);

    let scenario_route = warp::path!("api" / "v1" / "scenarios")
        .and(warp::post())
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(versions::create_scenario);

    let templates_route = warp::path!("api" / "v1" / "scenarios" / "templates")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(versions::get_templates);

    let ui_route = warp::path!("api" / "v1" / "ui")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(ui::get_ui);

    let notification_route = warp::path!("api" / "v1" / "ui" / "notifications")
        .and(warp::post())
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(ui::add_notification);

    let dismiss_route = warp::path!("api" / "v1" / "ui" / "notifications" / String / "dismiss")
        .and(warp::post())
        .and(store_filter.clone())
        .and_then(ui::dismiss_notification);

    let reports_route = warp::path!("api" / "v1" / "reports")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(reports::get_reports);

    let generate_route = warp::path!("api" / "v1" / "reports" / String)
        .and(warp::post())
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(reports::generate_report);

    let download_route =
        warp::path!("api" / "v1" / "reports" / String / "download" / ReportFormat)
            .and(warp::get())
            .and(store_filter.clone())
            .and_then(reports::download_report);

    let export_route = warp::path!("api" / "v1" / "data" / "export" / ExportFormat)
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(reports::export_data);

    info!("All routes configured successfully.");

    let portfolio_routes = portfolio_route
        .or(refresh_route)
        .or(contract_route)
        .or(portfolio_error_route);

    let version_routes = versions_route
        .or(create_version_route)
        .or(compare_route)
        .or(update_version_route)
        .or(delete_version_route)
        .or(activate_route)
        .or(select_route)
        .or(scenario_route)
        .or(templates_route);

    let ui_routes = ui_route.or(notification_route).or(dismiss_route);

    let report_routes = reports_route
        .or(generate_route)
        .or(download_route)
        .or(export_route);

    portfolio_routes
        .or(version_routes)
        .or(ui_routes)
        .or(report_routes)
        .recover(handle_rejection)
}
