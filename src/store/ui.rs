// src/store/ui.rs
use serde::{Deserialize, Serialize};

use super::{apply, Store};
use crate::models::Notification;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Ephemeral view state. Nothing here talks to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiState {
    pub sidebar_open: bool,
    pub theme: Theme,
    pub notifications: Vec<Notification>,
    pub loading: bool,
    pub current_page: String,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            sidebar_open: true,
            theme: Theme::Dark,
            notifications: Vec::new(),
            loading: false,
            current_page: "dashboard".to_string(),
        }
    }
}

impl UiState {
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn remove_notification(&mut self, id: &str) {
        self.notifications.retain(|n| n.id != id);
    }

    /// Marks the notification dismissed but keeps it in the list.
    pub fn dismiss_notification(&mut self, id: &str) {
        if let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) {
            n.dismissed = true;
        }
    }
}

impl Store {
    pub fn toggle_sidebar(&self) {
        apply(&self.ui, UiState::toggle_sidebar)
    }

    pub fn set_sidebar_open(&self, open: bool) {
        apply(&self.ui, |s| s.sidebar_open = open)
    }

    pub fn set_theme(&self, theme: Theme) {
        apply(&self.ui, |s| s.theme = theme)
    }

    pub fn add_notification(&self, notification: Notification) {
        apply(&self.ui, |s| s.notifications.push(notification))
    }

    pub fn remove_notification(&self, id: &str) {
        apply(&self.ui, |s| s.remove_notification(id))
    }

    pub fn dismiss_notification(&self, id: &str) {
        apply(&self.ui, |s| s.dismiss_notification(id))
    }

    pub fn clear_notifications(&self) {
        apply(&self.ui, |s| s.notifications.clear())
    }

    pub fn set_ui_loading(&self, loading: bool) {
        apply(&self.ui, |s| s.loading = loading)
    }

    pub fn set_current_page(&self, page: &str) {
        apply(&self.ui, |s| s.current_page = page.to_string())
    }
}
