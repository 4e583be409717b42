mod common;

use common::{metrics, version, wait_until, FakeGateway};
use credit_dashboard::models::VersionStatus;
use credit_dashboard::orchestrator::VersionSync;
use credit_dashboard::store::Store;
use std::sync::Arc;

async fn setup() -> (Arc<FakeGateway>, Arc<Store>) {
    let fake = FakeGateway::new();
    fake.with_versions(vec![
        version("v1", VersionStatus::Draft),
        version("v2", VersionStatus::Active),
    ])
    .await;
    let mut by_version = fake.metrics.lock().await;
    by_version.insert("v1".into(), metrics(1));
    by_version.insert("v2".into(), metrics(2));
    drop(by_version);
    let store = Arc::new(Store::new(fake.clone()));
    (fake, store)
}

#[tokio::test]
async fn listing_versions_loads_active_metrics_and_cashflow() {
    let (fake, store) = setup().await;
    let _sync = VersionSync::spawn(store.clone());
    let mut rx = store.subscribe_portfolio();

    store.fetch_versions().await;

    let state = wait_until(&mut rx, |s| {
        s.metrics.is_some() && s.cashflow.is_some() && !s.loading
    })
    .await;
    assert_eq!(state.metrics.map(|m| m.total_contracts), Some(2));
    assert_eq!(state.cashflow.map(|c| c.version_id), Some("v2".to_string()));

    let calls = fake.calls().await;
    assert!(calls.contains(&"metrics:v2".to_string()));
    assert!(calls.contains(&"cashflow:v2".to_string()));
}

#[tokio::test]
async fn local_switch_refetches_for_new_version() {
    let (fake, store) = setup().await;
    let _sync = VersionSync::spawn(store.clone());
    let mut rx = store.subscribe_portfolio();
    store.fetch_versions().await;
    wait_until(&mut rx, |s| s.metrics.is_some() && !s.loading).await;

    store.set_active_version_local("v1");

    let state = wait_until(&mut rx, |s| {
        s.cashflow.as_ref().map(|c| c.version_id.as_str()) == Some("v1") && !s.loading
    })
    .await;
    assert_eq!(state.metrics.map(|m| m.total_contracts), Some(1));
    // The server-side active version is untouched by a local switch.
    assert!(!fake.calls().await.iter().any(|c| c.starts_with("activate")));
}

#[tokio::test]
async fn unchanged_selection_does_not_refetch() {
    let (fake, store) = setup().await;
    let _sync = VersionSync::spawn(store.clone());
    let mut rx = store.subscribe_portfolio();
    store.fetch_versions().await;
    wait_until(&mut rx, |s| s.metrics.is_some() && !s.loading).await;

    store.fetch_versions().await;
    store.set_active_version_local("v2");
    // A real switch afterwards; once its metrics land, the updates above
    // have been seen by the sync task too.
    store.set_active_version_local("v1");
    wait_until(&mut rx, |s| {
        s.metrics.as_ref().map(|m| m.total_contracts) == Some(1) && !s.loading
    })
    .await;

    let metric_calls: Vec<String> = fake
        .calls()
        .await
        .into_iter()
        .filter(|c| c.starts_with("metrics:"))
        .collect();
    assert_eq!(metric_calls, ["metrics:v2", "metrics:v1"]);
}

#[tokio::test]
async fn slow_response_for_old_version_is_dropped() {
    let (fake, store) = setup().await;
    let slow = fake.hold("metrics:v2").await;
    let _sync = VersionSync::spawn(store.clone());
    let mut rx = store.subscribe_portfolio();

    store.fetch_versions().await;
    let mut versions = store.subscribe_versions();
    wait_until(&mut versions, |s| s.active_version.as_deref() == Some("v2")).await;
    while !fake.calls().await.contains(&"metrics:v2".to_string()) {
        tokio::task::yield_now().await;
    }

    store.set_active_version_local("v1");
    wait_until(&mut rx, |s| {
        s.metrics.as_ref().map(|m| m.total_contracts) == Some(1)
    })
    .await;

    slow.notify_one();
    let state = wait_until(&mut rx, |s| !s.loading).await;
    assert_eq!(state.metrics.map(|m| m.total_contracts), Some(1));
}

#[tokio::test]
async fn shutdown_stops_watching() {
    let (fake, store) = setup().await;
    let sync = VersionSync::spawn(store.clone());
    tokio::task::yield_now().await;
    sync.shutdown();
    tokio::task::yield_now().await;

    store.fetch_versions().await;
    tokio::task::yield_now().await;

    assert_eq!(fake.calls().await, ["list_versions"]);
}
