// src/store/versions.rs
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use super::coordinator::{AsyncSlice, Coordinator, OpKind, OpPhase, Settled};
use super::{apply, Store};
use crate::error::ValidationError;
use crate::models::{
    CalculationVersion, ScenarioDraft, ScenarioTemplate, VersionDraft, VersionPatch,
    VersionStatus,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionsState {
    pub versions: Vec<CalculationVersion>,
    pub active_version: Option<String>,
    pub comparison: Option<Value>,
    pub templates: Vec<ScenarioTemplate>,
    pub loading: bool,
    pub error: Option<String>,
    #[serde(skip)]
    ops: Coordinator,
}

impl AsyncSlice for VersionsState {
    const NAME: &'static str = "versions";

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

impl VersionsState {
    pub fn new(stale_guard: bool) -> Self {
        VersionsState {
            ops: Coordinator::new(stale_guard),
            ..Default::default()
        }
    }

    pub fn phase(&self, kind: OpKind) -> OpPhase {
        self.ops.phase(kind)
    }

    pub fn find(&self, id: &str) -> Option<&CalculationVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Replaces the list and adopts the server's active version, if it names one.
    pub fn apply_list(&mut self, versions: Vec<CalculationVersion>) {
        let mut active = versions.iter().filter(|v| v.status == VersionStatus::Active);
        if let Some(first) = active.next() {
            if active.next().is_some() {
                warn!("Server reports several active versions, using {}", first.id);
            }
            self.active_version = Some(first.id.clone());
        }
        self.versions = versions;
    }

    pub fn apply_created(&mut self, version: CalculationVersion) {
        match self.versions.iter_mut().find(|v| v.id == version.id) {
            Some(slot) => *slot = version,
            None => self.versions.push(version),
        }
    }

    /// Replaces the cached entry with the same id; unknown ids are ignored.
    pub fn apply_updated(&mut self, version: CalculationVersion) {
        if let Some(slot) = self.versions.iter_mut().find(|v| v.id == version.id) {
            *slot = version;
        }
    }

    pub fn apply_deleted(&mut self, id: &str) {
        self.versions.retain(|v| v.id != id);
        if self.active_version.as_deref() == Some(id) {
            self.active_version = None;
        }
    }

    /// Local projection of a confirmed activation: `id` becomes the only
    /// active version, every other cached version is draft.
    pub fn apply_activated(&mut self, id: &str, confirmed: Option<CalculationVersion>) {
        if let Some(version) = confirmed {
            self.apply_updated(version);
        }
        self.active_version = Some(id.to_string());
        for version in &mut self.versions {
            version.status = if version.id == id {
                VersionStatus::Active
            } else {
                VersionStatus::Draft
            };
        }
    }

    /// Selects a version for viewing without telling the server.
    pub fn set_active_local(&mut self, id: &str) {
        self.active_version = Some(id.to_string());
    }

    pub fn apply_comparison(&mut self, comparison: Value) {
        self.comparison = Some(comparison);
    }

    pub fn apply_templates(&mut self, templates: Vec<ScenarioTemplate>) {
        self.templates = templates;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

impl Store {
    pub async fn fetch_versions(&self) -> Settled {
        let ticket = apply(&self.versions, |s| s.begin(OpKind::VersionList));
        let outcome = self.gateway.list_versions().await;
        apply(&self.versions, |s| {
            s.settle(ticket, outcome, VersionsState::apply_list)
        })
    }

    /// Validation failures block the dispatch and leave the slice untouched.
    pub async fn create_version(&self, draft: VersionDraft) -> Result<Settled, ValidationError> {
        draft.validate(&self.versions.borrow().versions)?;
        let ticket = apply(&self.versions, |s| s.begin(OpKind::VersionMutation));
        let outcome = self.gateway.create_version(&draft).await;
        Ok(apply(&self.versions, |s| {
            s.settle(ticket, outcome, VersionsState::apply_created)
        }))
    }

    pub async fn update_version(
        &self,
        id: &str,
        patch: VersionPatch,
    ) -> Result<Settled, ValidationError> {
        patch.validate()?;
        let ticket = apply(&self.versions, |s| s.begin(OpKind::VersionMutation));
        let outcome = self.gateway.update_version(id, &patch).await;
        Ok(apply(&self.versions, |s| {
            s.settle(ticket, outcome, VersionsState::apply_updated)
        }))
    }

    pub async fn delete_version(&self, id: &str) -> Settled {
        let ticket = apply(&self.versions, |s| s.begin(OpKind::VersionMutation));
        let outcome = self.gateway.delete_version(id).await;
        apply(&self.versions, |s| {
            s.settle(ticket, outcome, |s, ()| s.apply_deleted(id))
        })
    }

    /// Server-confirmed activation, as opposed to [`Store::set_active_version_local`].
    pub async fn activate_version(&self, id: &str) -> Settled {
        info!("Activating version {}", id);
        let ticket = apply(&self.versions, |s| s.begin(OpKind::VersionMutation));
        let outcome = self.gateway.activate_version(id).await;
        apply(&self.versions, |s| {
            s.settle(ticket, outcome, |s, confirmed| s.apply_activated(id, confirmed))
        })
    }

    /// Switches the viewed version locally; the server's active version is unchanged.
    pub fn set_active_version_local(&self, id: &str) {
        info!("Selecting version {} locally", id);
        apply(&self.versions, |s| s.set_active_local(id))
    }

    pub async fn compare_versions(&self, first_id: &str, second_id: &str) -> Settled {
        let ticket = apply(&self.versions, |s| s.begin(OpKind::Comparison));
        let outcome = self.gateway.compare_versions(first_id, second_id).await;
        apply(&self.versions, |s| {
            s.settle(ticket, outcome, VersionsState::apply_comparison)
        })
    }

    pub async fn create_scenario(&self, draft: ScenarioDraft) -> Result<Settled, ValidationError> {
        draft.validate(&self.versions.borrow().versions)?;
        let ticket = apply(&self.versions, |s| s.begin(OpKind::VersionMutation));
        let outcome = self.gateway.create_scenario(&draft).await;
        Ok(apply(&self.versions, |s| {
            s.settle(ticket, outcome, VersionsState::apply_created)
        }))
    }

    pub async fn fetch_scenario_templates(&self) -> Settled {
        let ticket = apply(&self.versions, |s| s.begin(OpKind::Templates));
        let outcome = self.gateway.scenario_templates().await;
        apply(&self.versions, |s| {
            s.settle(ticket, outcome, VersionsState::apply_templates)
        })
    }

    pub fn clear_versions_error(&self) {
        apply(&self.versions, VersionsState::clear_error)
    }
}
