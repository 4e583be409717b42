// src/services/gateway.rs
use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayResult;
use crate::models::{
    CalculationVersion, CreditContract, ExportFormat, PortfolioCashflow, PortfolioData,
    PortfolioMetrics, ReportFormat, ReportHandle, ScenarioDraft, ScenarioTemplate, VersionDraft,
    VersionPatch,
};

/// One method per backend capability. Implementations only perform I/O and
/// return data; folding results into state is the store's job.
#[async_trait]
pub trait PortfolioGateway: Send + Sync {
    async fn get_portfolio_data(&self) -> GatewayResult<PortfolioData>;

    /// Same shape as `get_portfolio_data`, but the server recomputes first.
    async fn refresh_portfolio_data(&self) -> GatewayResult<PortfolioData>;

    async fn get_portfolio_metrics(&self, version_id: &str) -> GatewayResult<PortfolioMetrics>;

    async fn get_portfolio_cashflow(&self, version_id: &str) -> GatewayResult<PortfolioCashflow>;

    async fn get_contract(&self, contract_id: &str) -> GatewayResult<CreditContract>;

    async fn list_versions(&self) -> GatewayResult<Vec<CalculationVersion>>;

    async fn create_version(&self, draft: &VersionDraft) -> GatewayResult<CalculationVersion>;

    async fn update_version(
        &self,
        id: &str,
        patch: &VersionPatch,
    ) -> GatewayResult<CalculationVersion>;

    async fn delete_version(&self, id: &str) -> GatewayResult<()>;

    /// The backend may answer with the activated record or a bare acknowledgement.
    async fn activate_version(&self, id: &str) -> GatewayResult<Option<CalculationVersion>>;

    async fn compare_versions(&self, first_id: &str, second_id: &str) -> GatewayResult<Value>;

    async fn create_scenario(&self, draft: &ScenarioDraft) -> GatewayResult<CalculationVersion>;

    async fn scenario_templates(&self) -> GatewayResult<Vec<ScenarioTemplate>>;

    async fn generate_report(&self, report_type: &str, params: &Value)
        -> GatewayResult<ReportHandle>;

    async fn download_report(&self, report_id: &str, format: ReportFormat)
        -> GatewayResult<Vec<u8>>;

    async fn export_data(&self, format: ExportFormat) -> GatewayResult<Vec<u8>>;

    async fn import_data(&self, file_name: &str, contents: Vec<u8>) -> GatewayResult<Value>;
}
