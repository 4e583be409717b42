// src/services/api.rs
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::DashboardConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{
    CalculationVersion, CreditContract, ExportFormat, PortfolioCashflow, PortfolioData,
    PortfolioMetrics, ReportFormat, ReportHandle, ScenarioDraft, ScenarioTemplate, VersionDraft,
    VersionPatch,
};
use crate::services::gateway::PortfolioGateway;

/// HTTP client for the portfolio API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        info!("API client targeting {} (timeout {:?})", base_url, timeout);
        Ok(ApiClient { base_url, client })
    }

    pub fn from_config(config: &DashboardConfig) -> GatewayResult<Self> {
        ApiClient::new(&config.api_base_url, config.request_timeout)
    }

    /// Appends path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Sends the request and turns non-2xx answers into `GatewayError::Api`.
    async fn send(&self, request: RequestBuilder) -> GatewayResult<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            error!("API request failed: {}", e);
            GatewayError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if !status.is_success() {
            let err = error_from_response(status, &body);
            error!("API responded with {}: {}", status, err);
            return Err(err);
        }
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> GatewayResult<T> {
        self.fetch(self.request(Method::GET, segments)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> GatewayResult<T> {
        self.fetch(self.request(Method::POST, segments).json(body)).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<Value>,
    message: Option<String>,
    detail: Option<Value>,
    error: Option<String>,
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Normalizes `{code, message}`, `{detail}` and `{error}` bodies into `GatewayError::Api`.
pub fn error_from_response(status: StatusCode, body: &[u8]) -> GatewayError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    let code = parsed
        .code
        .map(value_text)
        .unwrap_or_else(|| status.as_u16().to_string());

    let raw = String::from_utf8_lossy(body).trim().to_string();
    let message = parsed
        .message
        .or_else(|| parsed.detail.map(value_text))
        .or(parsed.error)
        .filter(|m| !m.is_empty())
        .or_else(|| (!raw.is_empty()).then_some(raw))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    GatewayError::Api { code, message }
}

#[async_trait]
impl PortfolioGateway for ApiClient {
    async fn get_portfolio_data(&self) -> GatewayResult<PortfolioData> {
        self.get(&["portfolio", "data"]).await
    }

    async fn refresh_portfolio_data(&self) -> GatewayResult<PortfolioData> {
        self.fetch(self.request(Method::POST, &["portfolio", "refresh"]))
            .await
    }

    async fn get_portfolio_metrics(&self, version_id: &str) -> GatewayResult<PortfolioMetrics> {
        self.get(&["portfolio", "metrics", version_id]).await
    }

    async fn get_portfolio_cashflow(&self, version_id: &str) -> GatewayResult<PortfolioCashflow> {
        self.get(&["portfolio", "cashflow", version_id]).await
    }

    async fn get_contract(&self, contract_id: &str) -> GatewayResult<CreditContract> {
        self.get(&["portfolio", "contracts", contract_id]).await
    }

    async fn list_versions(&self) -> GatewayResult<Vec<CalculationVersion>> {
        self.get(&["versions"]).await
    }

    async fn create_version(&self, draft: &VersionDraft) -> GatewayResult<CalculationVersion> {
        self.post(&["versions"], draft).await
    }

    async fn update_version(
        &self,
        id: &str,
        patch: &VersionPatch,
    ) -> GatewayResult<CalculationVersion> {
        self.fetch(self.request(Method::PUT, &["versions", id]).json(patch))
            .await
    }

    async fn delete_version(&self, id: &str) -> GatewayResult<()> {
        self.send(self.request(Method::DELETE, &["versions", id]))
            .await?;
        Ok(())
    }

    async fn activate_version(&self, id: &str) -> GatewayResult<Option<CalculationVersion>> {
        let body = self
            .send(self.request(Method::POST, &["versions", id, "activate"]))
            .await?;
        if body.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(&body)?;
        Ok(serde_json::from_value(value).ok())
    }

    async fn compare_versions(&self, first_id: &str, second_id: &str) -> GatewayResult<Value> {
        self.get(&["versions", "compare", first_id, second_id]).await
    }

    async fn create_scenario(&self, draft: &ScenarioDraft) -> GatewayResult<CalculationVersion> {
        self.post(&["scenarios"], draft).await
    }

    async fn scenario_templates(&self) -> GatewayResult<Vec<ScenarioTemplate>> {
        self.get(&["scenarios", "templates"]).await
    }

    async fn generate_report(
        &self,
        report_type: &str,
        params: &Value,
    ) -> GatewayResult<ReportHandle> {
        self.post(&["reports", report_type], params).await
    }

    async fn download_report(
        &self,
        report_id: &str,
        format: ReportFormat,
    ) -> GatewayResult<Vec<u8>> {
        self.send(self.request(
            Method::GET,
            &["reports", report_id, "download", format.as_str()],
        ))
        .await
    }

    async fn export_data(&self, format: ExportFormat) -> GatewayResult<Vec<u8>> {
        self.send(self.request(Method::GET, &["data", "export", format.as_str()]))
            .await
    }

    async fn import_data(&self, file_name: &str, contents: Vec<u8>) -> GatewayResult<Value> {
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        self.fetch(self.request(Method::POST, &["data", "import"]).multipart(form))
            .await
    }
}
