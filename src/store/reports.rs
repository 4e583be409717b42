// src/store/reports.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::coordinator::{AsyncSlice, Coordinator, OpKind, OpPhase, Settled, Ticket};
use super::{apply, Store};
use crate::error::{GatewayResult, ValidationError};
use crate::models::{ExportFormat, ReportFormat, ReportHandle};

/// Number of download records kept; older ones are dropped first.
pub const DOWNLOAD_HISTORY: usize = 50;

/// A binary payload handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRecord {
    /// Report id, or `"export"` for bulk exports.
    pub target: String,
    pub format: String,
    pub size: usize,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportsState {
    pub reports: Vec<ReportHandle>,
    /// Most recent downloads and exports, oldest first, at most
    /// `DOWNLOAD_HISTORY` entries.
    pub downloads: Vec<DownloadRecord>,
    pub last_import: Option<Value>,
    pub loading: bool,
    pub error: Option<String>,
    #[serde(skip)]
    ops: Coordinator,
}

impl AsyncSlice for ReportsState {
    const NAME: &'static str = "reports";

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

impl ReportsState {
    pub fn new(stale_guard: bool) -> Self {
        ReportsState {
            ops: Coordinator::new(stale_guard),
            ..Default::default()
        }
    }

    pub fn phase(&self, kind: OpKind) -> OpPhase {
        self.ops.phase(kind)
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn record_download(&mut self, target: &str, format: &str, size: usize) {
        self.downloads.push(DownloadRecord {
            target: target.to_string(),
            format: format.to_string(),
            size,
            downloaded_at: Utc::now(),
        });
        if self.downloads.len() > DOWNLOAD_HISTORY {
            let excess = self.downloads.len() - DOWNLOAD_HISTORY;
            self.downloads.drain(..excess);
        }
    }
}

impl Store {
    pub async fn generate_report(
        &self,
        report_type: &str,
        params: Value,
    ) -> Result<Settled, ValidationError> {
        if report_type.trim().is_empty() {
            return Err(ValidationError::BlankField("report type"));
        }
        let ticket = apply(&self.reports, |s| s.begin(OpKind::Report));
        let outcome = self.gateway.generate_report(report_type, &params).await;
        Ok(apply(&self.reports, |s| {
            s.settle(ticket, outcome, |s, handle| s.reports.push(handle))
        }))
    }

    /// Returns the payload on success. On failure the reason is on the slice.
    pub async fn download_report(&self, report_id: &str, format: ReportFormat) -> Option<Vec<u8>> {
        let ticket = apply(&self.reports, |s| s.begin(OpKind::Download));
        let outcome = self.gateway.download_report(report_id, format).await;
        self.settle_download(ticket, outcome, report_id, format.as_str())
    }

    pub async fn export_data(&self, format: ExportFormat) -> Option<Vec<u8>> {
        let ticket = apply(&self.reports, |s| s.begin(OpKind::Export));
        let outcome = self.gateway.export_data(format).await;
        self.settle_download(ticket, outcome, "export", format.as_str())
    }

    fn settle_download(
        &self,
        ticket: Ticket,
        outcome: GatewayResult<Vec<u8>>,
        target: &str,
        format: &str,
    ) -> Option<Vec<u8>> {
        let size = outcome.as_ref().map(|bytes| bytes.len()).map_err(|e| e.clone());
        let settled = apply(&self.reports, |s| {
            s.settle(ticket, size, |s, size| s.record_download(target, format, size))
        });
        match settled {
            Settled::Fulfilled => outcome.ok(),
            _ => None,
        }
    }

    pub async fn import_data(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Settled, ValidationError> {
        if contents.is_empty() {
            return Err(ValidationError::EmptyImport(file_name.to_string()));
        }
        let ticket = apply(&self.reports, |s| s.begin(OpKind::Import));
        let outcome = self.gateway.import_data(file_name, contents).await;
        Ok(apply(&self.reports, |s| {
            s.settle(ticket, outcome, |s, summary| s.last_import = Some(summary))
        }))
    }

    pub fn clear_reports_error(&self) {
        apply(&self.reports, ReportsState::clear_error)
    }
}
