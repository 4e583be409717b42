// src/store/mod.rs
//! The owned state container.
//!
//! Every slice lives in its own `watch` channel. Folds run inside
//! `send_modify`, so a fold is never observed half-applied and subscribers
//! wake only once it is complete. The view layer reads snapshots or
//! subscribes; it changes state only through the operations defined on
//! [`Store`] in the slice modules.

pub mod coordinator;
pub mod portfolio;
pub mod reports;
pub mod ui;
pub mod versions;

use std::sync::Arc;
use tokio::sync::watch;

use crate::config::DashboardConfig;
use crate::services::PortfolioGateway;

pub use coordinator::{OpKind, OpPhase, Settled};
pub use portfolio::PortfolioState;
pub use reports::{DownloadRecord, ReportsState};
pub use ui::{Theme, UiState};
pub use versions::VersionsState;

pub struct Store {
    gateway: Arc<dyn PortfolioGateway>,
    portfolio: watch::Sender<PortfolioState>,
    versions: watch::Sender<VersionsState>,
    ui: watch::Sender<UiState>,
    reports: watch::Sender<ReportsState>,
}

impl Store {
    pub fn new(gateway: Arc<dyn PortfolioGateway>) -> Self {
        Store::with_stale_guard(gateway, true)
    }

    pub fn from_config(gateway: Arc<dyn PortfolioGateway>, config: &DashboardConfig) -> Self {
        Store::with_stale_guard(gateway, config.stale_guard)
    }

    /// With `stale_guard` off, whichever dispatch settles last wins.
    pub fn with_stale_guard(gateway: Arc<dyn PortfolioGateway>, stale_guard: bool) -> Self {
        let (portfolio, _) = watch::channel(PortfolioState::new(stale_guard));
        let (versions, _) = watch::channel(VersionsState::new(stale_guard));
        let (ui, _) = watch::channel(UiState::default());
        let (reports, _) = watch::channel(ReportsState::new(stale_guard));
        Store {
            gateway,
            portfolio,
            versions,
            ui,
            reports,
        }
    }

    pub fn portfolio(&self) -> PortfolioState {
        self.portfolio.borrow().clone()
    }

    pub fn versions(&self) -> VersionsState {
        self.versions.borrow().clone()
    }

    pub fn ui(&self) -> UiState {
        self.ui.borrow().clone()
    }

    pub fn reports(&self) -> ReportsState {
        self.reports.borrow().clone()
    }

    pub fn subscribe_portfolio(&self) -> watch::Receiver<PortfolioState> {
        self.portfolio.subscribe()
    }

    pub fn subscribe_versions(&self) -> watch::Receiver<VersionsState> {
        self.versions.subscribe()
    }

    pub fn subscribe_ui(&self) -> watch::Receiver<UiState> {
        self.ui.subscribe()
    }

    pub fn subscribe_reports(&self) -> watch::Receiver<ReportsState> {
        self.reports.subscribe()
    }
}

/// Runs `fold` against the slice and notifies subscribers once it returns.
fn apply<S, R>(slice: &watch::Sender<S>, fold: impl FnOnce(&mut S) -> R) -> R {
    let mut result = None;
    slice.send_modify(|state| result = Some(fold(state)));
    result.unwrap_or_else(|| unreachable!("send_modify runs its closure exactly once"))
}
