mod common;

use common::{contract, version, FakeGateway};
use credit_dashboard::error::GatewayError;
use credit_dashboard::models::{PortfolioData, VersionStatus};
use credit_dashboard::routes::routes;
use credit_dashboard::store::Store;
use serde_json::{json, Value};
use std::sync::Arc;
use warp::http::StatusCode;

async fn setup() -> (Arc<FakeGateway>, Arc<Store>) {
    let fake = FakeGateway::new();
    fake.with_versions(vec![
        version("v1", VersionStatus::Active),
        version("v2", VersionStatus::Draft),
    ])
    .await;
    *fake.portfolio.lock().await = PortfolioData {
        contracts: vec![contract("C1")],
        ..Default::default()
    };
    let store = Arc::new(Store::new(fake.clone()));
    (fake, store)
}

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn portfolio_snapshot_is_served() {
    let (_fake, store) = setup().await;
    store.fetch_portfolio_data().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/portfolio")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body(&response);
    assert_eq!(snapshot["contracts"][0]["id"], "C1");
    assert_eq!(snapshot["loading"], false);
    assert!(snapshot.get("ops").is_none());
}

#[tokio::test]
async fn activation_route_returns_projected_versions() {
    let (_fake, store) = setup().await;
    store.fetch_versions().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/versions/v2/activate")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body(&response);
    assert_eq!(snapshot["active_version"], "v2");
    assert_eq!(snapshot["versions"][0]["status"], "draft");
    assert_eq!(snapshot["versions"][1]["status"], "active");
}

#[tokio::test]
async fn invalid_version_draft_is_a_bad_request() {
    let (fake, store) = setup().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/versions")
        .json(&json!({"name": " ", "version_type": "base"}))
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["error"], "name must not be blank");
    assert!(fake.calls().await.is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (_fake, store) = setup().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/scenarios")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_download_is_a_bad_gateway() {
    let (_fake, store) = setup().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/reports/report_1/download/pdf")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body(&response)["error"], "Not implemented");
}

#[tokio::test]
async fn export_sets_content_type() {
    let (_fake, store) = setup().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/data/export/csv")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv");
    assert_eq!(&response.body()[..], b"export.csv");
}

#[tokio::test]
async fn upstream_failure_is_reported_in_snapshot() {
    let (fake, store) = setup().await;
    fake.fail("refresh", GatewayError::api("500", "boom")).await;
    let api = routes(store);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/portfolio/refresh")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["error"], "boom");
}

#[tokio::test]
async fn notifications_can_be_dismissed() {
    let (_fake, store) = setup().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/ui/notifications")
        .json(&json!({
            "id": "n1",
            "type": "warning",
            "title": "Limit",
            "message": "Utilization above 90%",
            "severity": "high",
            "timestamp": "2024-01-15T10:30:00Z"
        }))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["notifications"][0]["dismissed"], false);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/ui/notifications/n1/dismiss")
        .reply(&api)
        .await;
    assert_eq!(body(&response)["notifications"][0]["dismissed"], true);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let (_fake, store) = setup().await;
    let api = routes(store);

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/nowhere")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/data/export/xml")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
