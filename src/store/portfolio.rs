// src/store/portfolio.rs
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::coordinator::{AsyncSlice, Coordinator, OpKind, OpPhase, Settled, Ticket};
use super::{apply, Store};
use crate::error::ValidationError;
use crate::models::{
    CreditContract, Drawdown, PortfolioCashflow, PortfolioData, PortfolioMetrics, Repayment,
};

/// Contracts, flows, and the version-scoped metrics/cashflow caches.
///
/// `metrics` and `cashflow` hold whichever version was fetched last; there is
/// no per-version cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioState {
    pub contracts: Vec<CreditContract>,
    pub drawdowns: Vec<Drawdown>,
    pub repayments: Vec<Repayment>,
    pub cashflow: Option<PortfolioCashflow>,
    pub metrics: Option<PortfolioMetrics>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    ops: Coordinator,
}

impl AsyncSlice for PortfolioState {
    const NAME: &'static str = "portfolio";

    fn coordinator(&mut self) -> &mut Coordinator {
        &mut self.ops
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

impl PortfolioState {
    pub fn new(stale_guard: bool) -> Self {
        PortfolioState {
            ops: Coordinator::new(stale_guard),
            ..Default::default()
        }
    }

    pub fn phase(&self, kind: OpKind) -> OpPhase {
        self.ops.phase(kind)
    }

    /// Replaces contracts, drawdowns and repayments wholesale.
    pub fn apply_data(&mut self, data: PortfolioData, now: DateTime<Utc>) {
        for contract in &data.contracts {
            if let Err(e) = contract.check_limits() {
                warn!("Server sent inconsistent contract: {}", e);
            }
        }
        self.contracts = data.contracts;
        self.drawdowns = data.drawdowns;
        self.repayments = data.repayments;
        self.last_updated = Some(now);
    }

    pub fn apply_metrics(&mut self, metrics: PortfolioMetrics) {
        self.metrics = Some(metrics);
    }

    pub fn apply_cashflow(&mut self, cashflow: PortfolioCashflow) {
        self.cashflow = Some(cashflow);
    }

    /// Replaces the contract with the same id, or appends it.
    pub fn upsert_contract(&mut self, contract: CreditContract) {
        match self.contracts.iter_mut().find(|c| c.id == contract.id) {
            Some(slot) => *slot = contract,
            None => self.contracts.push(contract),
        }
    }

    pub fn add_contract(&mut self, contract: CreditContract) -> Result<(), ValidationError> {
        contract.check_limits()?;
        self.contracts.push(contract);
        Ok(())
    }

    /// Returns `false` when no cached contract has that id.
    pub fn update_contract(&mut self, contract: CreditContract) -> Result<bool, ValidationError> {
        contract.check_limits()?;
        match self.contracts.iter_mut().find(|c| c.id == contract.id) {
            Some(slot) => {
                *slot = contract;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_contract(&mut self, contract_id: &str) -> bool {
        let before = self.contracts.len();
        self.contracts.retain(|c| c.id != contract_id);
        self.contracts.len() != before
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

impl Store {
    pub async fn fetch_portfolio_data(&self) -> Settled {
        let ticket = apply(&self.portfolio, |s| s.begin(OpKind::PortfolioData));
        let outcome = self.gateway.get_portfolio_data().await;
        apply(&self.portfolio, |s| {
            s.settle(ticket, outcome, |s, data| s.apply_data(data, Utc::now()))
        })
    }

    /// Asks the server to recompute, then folds the result like a fetch.
    pub async fn refresh_portfolio_data(&self) -> Settled {
        info!("Refreshing portfolio data");
        let ticket = apply(&self.portfolio, |s| s.begin(OpKind::PortfolioData));
        let outcome = self.gateway.refresh_portfolio_data().await;
        apply(&self.portfolio, |s| {
            s.settle(ticket, outcome, |s, data| s.apply_data(data, Utc::now()))
        })
    }

    pub async fn fetch_portfolio_metrics(&self, version_id: &str) -> Settled {
        let ticket = apply(&self.portfolio, |s| s.begin(OpKind::Metrics));
        self.complete_metrics(ticket, version_id).await
    }

    pub async fn fetch_portfolio_cashflow(&self, version_id: &str) -> Settled {
        let ticket = apply(&self.portfolio, |s| s.begin(OpKind::Cashflow));
        self.complete_cashflow(ticket, version_id).await
    }

    /// Dispatches now and lets the request run on its own task. The pending
    /// transition (and its sequence number) happens before this returns.
    pub fn spawn_portfolio_metrics(self: &Arc<Self>, version_id: &str) -> JoinHandle<Settled> {
        let ticket = apply(&self.portfolio, |s| s.begin(OpKind::Metrics));
        let store = Arc::clone(self);
        let version_id = version_id.to_string();
        tokio::spawn(async move { store.complete_metrics(ticket, &version_id).await })
    }

    pub fn spawn_portfolio_cashflow(self: &Arc<Self>, version_id: &str) -> JoinHandle<Settled> {
        let ticket = apply(&self.portfolio, |s| s.begin(OpKind::Cashflow));
        let store = Arc::clone(self);
        let version_id = version_id.to_string();
        tokio::spawn(async move { store.complete_cashflow(ticket, &version_id).await })
    }

    async fn complete_metrics(&self, ticket: Ticket, version_id: &str) -> Settled {
        let outcome = self.gateway.get_portfolio_metrics(version_id).await;
        apply(&self.portfolio, |s| {
            s.settle(ticket, outcome, PortfolioState::apply_metrics)
        })
    }

    async fn complete_cashflow(&self, ticket: Ticket, version_id: &str) -> Settled {
        let outcome = self.gateway.get_portfolio_cashflow(version_id).await;
        apply(&self.portfolio, |s| {
            s.settle(ticket, outcome, PortfolioState::apply_cashflow)
        })
    }

    pub async fn fetch_contract(&self, contract_id: &str) -> Settled {
        let ticket = apply(&self.portfolio, |s| s.begin(OpKind::Contract));
        let outcome = self.gateway.get_contract(contract_id).await;
        apply(&self.portfolio, |s| {
            s.settle(ticket, outcome, PortfolioState::upsert_contract)
        })
    }

    pub fn add_contract(&self, contract: CreditContract) -> Result<(), ValidationError> {
        apply(&self.portfolio, |s| s.add_contract(contract))
    }

    pub fn update_contract(&self, contract: CreditContract) -> Result<bool, ValidationError> {
        apply(&self.portfolio, |s| s.update_contract(contract))
    }

    pub fn remove_contract(&self, contract_id: &str) -> bool {
        apply(&self.portfolio, |s| s.remove_contract(contract_id))
    }

    pub fn clear_portfolio_error(&self) {
        apply(&self.portfolio, PortfolioState::clear_error)
    }
}
