// src/orchestrator.rs
//! Keeps the version-scoped portfolio caches in step with the active version.
//!
//! The store never chains fetches across slices. `VersionSync` subscribes to
//! the versions slice and, whenever `active_version` changes to a new id,
//! re-issues the metrics and cashflow fetches for it.

use log::{debug, info};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::store::{Store, VersionsState};

pub struct VersionSync {
    handle: JoinHandle<()>,
}

impl VersionSync {
    /// Starts watching. An already-selected version is fetched immediately.
    pub fn spawn(store: Arc<Store>) -> Self {
        let versions = store.subscribe_versions();
        let handle = tokio::spawn(run(store, versions));
        VersionSync { handle }
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for VersionSync {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(store: Arc<Store>, mut versions: watch::Receiver<VersionsState>) {
    let mut synced: Option<String> = None;
    loop {
        let active = versions.borrow_and_update().active_version.clone();
        if active != synced {
            if let Some(id) = &active {
                info!("Active version is now {}, refetching metrics and cashflow", id);
                spawn_dependent_fetches(&store, id);
            }
            synced = active;
        }
        if versions.changed().await.is_err() {
            debug!("Versions slice closed, stopping version sync");
            break;
        }
    }
}

/// The fetches run detached so a slow response never delays the next switch.
/// Both are dispatched before returning, so their sequence numbers follow the
/// order of switches and the portfolio slice drops any that settle late.
fn spawn_dependent_fetches(store: &Arc<Store>, version_id: &str) {
    store.spawn_portfolio_metrics(version_id);
    store.spawn_portfolio_cashflow(version_id);
}
