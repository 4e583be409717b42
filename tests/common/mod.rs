#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use credit_dashboard::error::{GatewayError, GatewayResult};
use credit_dashboard::models::{
    CalculationVersion, CreditContract, CreditType, Currency, ExportFormat, PaymentFrequency,
    PortfolioCashflow, PortfolioData, PortfolioMetrics, ReportFormat, ReportHandle,
    ScenarioDraft, ScenarioTemplate, ScheduleType, VersionDraft, VersionPatch, VersionStatus,
    VersionType,
};
use credit_dashboard::services::PortfolioGateway;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};

pub fn ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

pub fn contract(id: &str) -> CreditContract {
    CreditContract {
        id: id.to_string(),
        credit_type: CreditType::CreditLine,
        currency: Currency::Rub,
        total_limit: 1_000_000.0,
        available_limit: 400_000.0,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        payment_schedule_type: ScheduleType::Annuity,
        interest_payment_frequency: PaymentFrequency::Monthly,
        principal_payment_frequency: PaymentFrequency::Quarterly,
        interest_rate_base: Some(0.16),
        margin: Some(0.02),
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn version(id: &str, status: VersionStatus) -> CalculationVersion {
    CalculationVersion {
        id: id.to_string(),
        name: format!("Version {}", id),
        description: None,
        version_type: VersionType::Base,
        status,
        base_version_id: None,
        scenario_parameters: Map::new(),
        created_at: ts(),
        created_by: "system".to_string(),
        updated_at: ts(),
    }
}

/// Metrics tagged with `total_contracts` so tests can tell responses apart.
pub fn metrics(tag: u32) -> PortfolioMetrics {
    PortfolioMetrics {
        total_contracts: tag,
        total_limit: 1_000_000.0,
        total_utilized: 600_000.0,
        total_available: 400_000.0,
        utilization_ratio: 0.6,
        ..Default::default()
    }
}

pub fn cashflow(version_id: &str) -> PortfolioCashflow {
    PortfolioCashflow {
        version_id: version_id.to_string(),
        cashflow_items: Vec::new(),
        report_start_date: None,
        report_end_date: None,
        total_drawdowns: 0.0,
        total_principal_payments: 0.0,
        total_interest_payments: 0.0,
        debt_balance_start_period: 0.0,
        debt_balance_end_period: 0.0,
        limit_balance_start_period: 0.0,
        limit_balance_end_period: 0.0,
    }
}

/// In-memory stand-in for the remote API. Versions behave like the backend:
/// activation makes one version active and resets the rest to draft.
///
/// Every call is recorded under a key such as `"metrics:v2"`. A key can be
/// made to fail (`fail`) or to wait until released (`hold`).
#[derive(Default)]
pub struct FakeGateway {
    pub portfolio: Mutex<PortfolioData>,
    pub versions: Mutex<Vec<CalculationVersion>>,
    pub metrics: Mutex<HashMap<String, PortfolioMetrics>>,
    pub payloads: Mutex<HashMap<String, Vec<u8>>>,
    pub calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, GatewayError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    created: Mutex<u32>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeGateway::default())
    }

    pub async fn with_versions(self: &Arc<Self>, versions: Vec<CalculationVersion>) {
        *self.versions.lock().await = versions;
    }

    pub async fn fail(&self, key: &str, err: GatewayError) {
        self.failures.lock().await.insert(key.to_string(), err);
    }

    pub async fn recover(&self, key: &str) {
        self.failures.lock().await.remove(key);
    }

    /// Calls under `key` block until the returned `Notify` is signalled.
    pub async fn hold(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().await.insert(key.to_string(), gate.clone());
        gate
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn enter(&self, key: String) -> GatewayResult<()> {
        self.calls.lock().await.push(key.clone());
        let gate = self.gates.lock().await.get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.failures.lock().await.get(&key) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn next_id(&self) -> String {
        let mut created = self.created.lock().await;
        *created += 1;
        format!("srv-{}", created)
    }
}

#[async_trait]
impl PortfolioGateway for FakeGateway {
    async fn get_portfolio_data(&self) -> GatewayResult<PortfolioData> {
        self.enter("portfolio_data".into()).await?;
        Ok(self.portfolio.lock().await.clone())
    }

    async fn refresh_portfolio_data(&self) -> GatewayResult<PortfolioData> {
        self.enter("refresh".into()).await?;
        Ok(self.portfolio.lock().await.clone())
    }

    async fn get_portfolio_metrics(&self, version_id: &str) -> GatewayResult<PortfolioMetrics> {
        self.enter(format!("metrics:{}", version_id)).await?;
        self.metrics
            .lock()
            .await
            .get(version_id)
            .cloned()
            .ok_or_else(|| GatewayError::api("404", "Version not found"))
    }

    async fn get_portfolio_cashflow(&self, version_id: &str) -> GatewayResult<PortfolioCashflow> {
        self.enter(format!("cashflow:{}", version_id)).await?;
        Ok(cashflow(version_id))
    }

    async fn get_contract(&self, contract_id: &str) -> GatewayResult<CreditContract> {
        self.enter(format!("contract:{}", contract_id)).await?;
        Ok(contract(contract_id))
    }

    /// Answers with the list as it stood when the request arrived.
    async fn list_versions(&self) -> GatewayResult<Vec<CalculationVersion>> {
        let snapshot = self.versions.lock().await.clone();
        self.enter("list_versions".into()).await?;
        Ok(snapshot)
    }

    async fn create_version(&self, draft: &VersionDraft) -> GatewayResult<CalculationVersion> {
        self.enter("create_version".into()).await?;
        let version = CalculationVersion {
            id: self.next_id().await,
            name: draft.name.clone(),
            description: draft.description.clone(),
            version_type: draft.version_type,
            status: VersionStatus::Draft,
            base_version_id: draft.base_version_id.clone(),
            scenario_parameters: draft.scenario_parameters.clone(),
            created_at: ts(),
            created_by: draft.created_by.clone().unwrap_or_else(|| "system".into()),
            updated_at: ts(),
        };
        self.versions.lock().await.push(version.clone());
        Ok(version)
    }

    async fn update_version(
        &self,
        id: &str,
        patch: &VersionPatch,
    ) -> GatewayResult<CalculationVersion> {
        self.enter(format!("update_version:{}", id)).await?;
        let mut versions = self.versions.lock().await;
        let version = versions
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| GatewayError::api("404", "Version not found"))?;
        if let Some(name) = &patch.name {
            version.name = name.clone();
        }
        if let Some(description) = &patch.description {
            version.description = Some(description.clone());
        }
        Ok(version.clone())
    }

    async fn delete_version(&self, id: &str) -> GatewayResult<()> {
        self.enter(format!("delete_version:{}", id)).await?;
        self.versions.lock().await.retain(|v| v.id != id);
        Ok(())
    }

    async fn activate_version(&self, id: &str) -> GatewayResult<Option<CalculationVersion>> {
        self.enter(format!("activate:{}", id)).await?;
        let mut versions = self.versions.lock().await;
        if !versions.iter().any(|v| v.id == id) {
            return Err(GatewayError::api("404", "Version not found"));
        }
        for version in versions.iter_mut() {
            version.status = if version.id == id {
                VersionStatus::Active
            } else {
                VersionStatus::Draft
            };
        }
        Ok(None)
    }

    async fn compare_versions(&self, first_id: &str, second_id: &str) -> GatewayResult<Value> {
        self.enter("compare".into()).await?;
        Ok(json!({"version1": first_id, "version2": second_id, "differences": {}}))
    }

    async fn create_scenario(&self, draft: &ScenarioDraft) -> GatewayResult<CalculationVersion> {
        self.enter("create_scenario".into()).await?;
        let mut version = version(&self.next_id().await, VersionStatus::Draft);
        version.name = draft.name.clone();
        version.version_type = VersionType::Scenario;
        version.base_version_id = Some(draft.base_version_id.clone());
        version.scenario_parameters = draft.parameters.clone();
        self.versions.lock().await.push(version.clone());
        Ok(version)
    }

    async fn scenario_templates(&self) -> GatewayResult<Vec<ScenarioTemplate>> {
        self.enter("templates".into()).await?;
        Ok(vec![ScenarioTemplate {
            id: "stress_test".into(),
            name: "Stress test".into(),
            description: String::new(),
            parameters: Map::new(),
        }])
    }

    async fn generate_report(
        &self,
        report_type: &str,
        _params: &Value,
    ) -> GatewayResult<ReportHandle> {
        self.enter("report".into()).await?;
        Ok(ReportHandle {
            report_id: format!("report_{}", report_type),
            status: "generated".into(),
            message: None,
        })
    }

    async fn download_report(
        &self,
        report_id: &str,
        format: ReportFormat,
    ) -> GatewayResult<Vec<u8>> {
        self.enter("download".into()).await?;
        self.payloads
            .lock()
            .await
            .get(&format!("{}.{}", report_id, format))
            .cloned()
            .ok_or_else(|| GatewayError::api("501", "Not implemented"))
    }

    async fn export_data(&self, format: ExportFormat) -> GatewayResult<Vec<u8>> {
        self.enter("export".into()).await?;
        Ok(format!("export.{}", format).into_bytes())
    }

    async fn import_data(&self, file_name: &str, contents: Vec<u8>) -> GatewayResult<Value> {
        self.enter("import".into()).await?;
        Ok(json!({"file": file_name, "bytes": contents.len()}))
    }
}

/// Waits (bounded) until the slice satisfies `ready`, returning that snapshot.
pub async fn wait_until<T: Clone>(rx: &mut watch::Receiver<T>, ready: impl Fn(&T) -> bool) -> T {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let current = rx.borrow_and_update();
                if ready(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("timed out waiting for state")
}
