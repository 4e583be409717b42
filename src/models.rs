// src/models.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    CreditLine,
    OneTimeLoan,
    Overdraft,
    Revolving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Annuity,
    Differentiated,
    Bullet,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditContract {
    pub id: String,
    pub credit_type: CreditType,
    pub currency: Currency,
    pub total_limit: f64,
    pub available_limit: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_schedule_type: ScheduleType,
    pub interest_payment_frequency: PaymentFrequency,
    pub principal_payment_frequency: PaymentFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate_base: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CreditContract {
    /// Checks `0 <= available_limit <= total_limit`.
    pub fn check_limits(&self) -> Result<(), ValidationError> {
        if self.available_limit < 0.0 || self.available_limit > self.total_limit {
            return Err(ValidationError::LimitOutOfRange {
                id: self.id.clone(),
                available: self.available_limit,
                total: self.total_limit,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Fixed,
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Planned,
    Actual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    pub id: String,
    pub contract_id: String,
    pub drawdown_date: NaiveDate,
    pub amount: f64,
    pub interest_rate_type: RateType,
    pub interest_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    pub status: FlowStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentType {
    Principal,
    Interest,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repayment {
    pub id: String,
    pub contract_id: String,
    pub repayment_date: NaiveDate,
    pub principal_amount: f64,
    pub interest_amount: f64,
    pub status: FlowStatus,
    pub repayment_type: RepaymentType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Body of `GET /portfolio/data` and `POST /portfolio/refresh`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioData {
    #[serde(default)]
    pub contracts: Vec<CreditContract>,
    #[serde(default)]
    pub drawdowns: Vec<Drawdown>,
    #[serde(default)]
    pub repayments: Vec<Repayment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    Base,
    Scenario,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Draft,
    Active,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationVersion {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version_type: VersionType,
    pub status: VersionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version_id: Option<String>,
    #[serde(default)]
    pub scenario_parameters: Map<String, Value>,
    pub created_at: NaiveDateTime,
    pub created_by: String,
    pub updated_at: NaiveDateTime,
}

/// Checks that `base_version_id` names a cached version of type base.
fn check_base_reference(
    base_version_id: &str,
    known: &[CalculationVersion],
) -> Result<(), ValidationError> {
    let is_base = known
        .iter()
        .any(|v| v.id == base_version_id && v.version_type == VersionType::Base);
    if is_base {
        Ok(())
    } else {
        Err(ValidationError::UnknownBaseVersion(base_version_id.to_string()))
    }
}

/// Payload of `POST /versions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version_type: VersionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version_id: Option<String>,
    #[serde(default)]
    pub scenario_parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl VersionDraft {
    pub fn validate(&self, known: &[CalculationVersion]) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("name"));
        }
        match (self.version_type, self.base_version_id.as_deref()) {
            (VersionType::Scenario, None) => Err(ValidationError::MissingBaseVersion),
            (VersionType::Scenario, Some(base)) => check_base_reference(base, known),
            (VersionType::Base, _) => Ok(()),
        }
    }
}

/// Payload of `PUT /versions/{id}`; absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VersionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_parameters: Option<Map<String, Value>>,
}

impl VersionPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(ValidationError::BlankField("name")),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    RateChange,
    AdditionalDrawdowns,
    EarlyRepayments,
    StressTest,
}

/// Payload of `POST /scenarios`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ScenarioKind>,
    pub base_version_id: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl ScenarioDraft {
    pub fn validate(&self, known: &[CalculationVersion]) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("name"));
        }
        if self.base_version_id.trim().is_empty() {
            return Err(ValidationError::MissingBaseVersion);
        }
        check_base_reference(&self.base_version_id, known)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationMetrics {
    pub hhi: f64,
    pub max_share: f64,
    pub large_contracts_count: u32,
    pub concentration_risk: ConcentrationRisk,
}

/// Server-computed aggregate for one version. Fields the client does not
/// know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    #[serde(default)]
    pub total_contracts: u32,
    #[serde(default)]
    pub total_limit: f64,
    #[serde(default)]
    pub total_utilized: f64,
    #[serde(default)]
    pub total_available: f64,
    #[serde(default)]
    pub utilization_ratio: f64,
    #[serde(default)]
    pub weighted_average_rate: f64,
    #[serde(
        default,
        deserialize_with = "concentration_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub concentration_metrics: Option<ConcentrationMetrics>,
    #[serde(default)]
    pub debt_balance_start: f64,
    #[serde(default)]
    pub debt_balance_end: f64,
    #[serde(default)]
    pub limit_balance_start: f64,
    #[serde(default)]
    pub limit_balance_end: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The server answers `{}` when there is nothing to measure (no contracts,
/// or a zero total limit).
fn concentration_or_none<'de, D>(deserializer: D) -> Result<Option<ConcentrationMetrics>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) if fields.is_empty() => Ok(None),
        Some(other) => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCashflowItem {
    pub cashflow_date: NaiveDate,
    #[serde(default)]
    pub total_drawdowns: f64,
    #[serde(default)]
    pub total_principal_payments: f64,
    #[serde(default)]
    pub total_interest_payments: f64,
    #[serde(default)]
    pub total_debt_balance: f64,
    #[serde(default)]
    pub total_available_limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCashflow {
    pub version_id: String,
    #[serde(default)]
    pub cashflow_items: Vec<PortfolioCashflowItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_drawdowns: f64,
    #[serde(default)]
    pub total_principal_payments: f64,
    #[serde(default)]
    pub total_interest_payments: f64,
    #[serde(default)]
    pub debt_balance_start_period: f64,
    #[serde(default)]
    pub debt_balance_end_period: f64,
    #[serde(default)]
    pub limit_balance_start_period: f64,
    #[serde(default)]
    pub limit_balance_end_period: f64,
}

/// Answer of `POST /reports/{type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHandle {
    pub report_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Pdf,
    Excel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
    Excel,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "excel",
        }
    }
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ReportFormat::Pdf),
            "excel" => Ok(ReportFormat::Excel),
            other => Err(format!("unsupported report format: {}", other)),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "excel" => Ok(ExportFormat::Excel),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A dashboard notification shown by the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub dismissed: bool,
}
