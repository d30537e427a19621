// src/notify.rs
//! Transient user-facing notifications and the presenters that show them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::FillerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    /// (background, text) colors used by the injected banner.
    pub fn colors(self) -> (&'static str, &'static str) {
        match self {
            NotificationLevel::Success => ("#28a745", "white"),
            NotificationLevel::Warning => ("#ffc107", "#212529"),
            NotificationLevel::Error => ("#dc3545", "white"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub ts: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            ts: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    /// Fixed-position banner markup; the message is HTML-escaped.
    pub fn to_html(&self) -> String {
        let (bg, fg) = self.level.colors();
        format!(
            r#"<div class="auto-filler-notification" style="position: fixed; top: 20px; right: 20px; background: {bg}; color: {fg}; padding: 15px 20px; border-radius: 8px; z-index: 10000; font-size: 14px; max-width: 300px;">{}</div>"#,
            html_escape::encode_text(&self.message)
        )
    }
}

impl From<&FillerError> for Notification {
    fn from(err: &FillerError) -> Self {
        match err {
            FillerError::Validation(v) => Notification::error(v.to_string()),
            FillerError::NoActivePage => Notification::error(err.to_string()),
            FillerError::Storage(_) => Notification::error("Storage is unavailable"),
        }
    }
}

#[async_trait]
pub trait NotificationPresenter: Send + Sync {
    async fn show(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

#[async_trait]
impl NotificationPresenter for LogPresenter {
    async fn show(&self, n: &Notification) {
        match n.level {
            NotificationLevel::Success => tracing::info!(target: "notify", "{}", n.message),
            NotificationLevel::Warning => tracing::warn!(target: "notify", "{}", n.message),
            NotificationLevel::Error => tracing::error!(target: "notify", "{}", n.message),
        }
    }
}

/// Logs and keeps every shown notification in order. The API returns the last one.
#[derive(Debug, Default)]
pub struct CollectingPresenter {
    shown: Mutex<Vec<Notification>>,
}

impl CollectingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.shown
            .lock()
            .ok()
            .and_then(|v| v.last().cloned())
    }

    pub fn take(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationPresenter for CollectingPresenter {
    async fn show(&self, n: &Notification) {
        LogPresenter.show(n).await;
        if let Ok(mut v) = self.shown.lock() {
            v.push(n.clone());
        }
    }
}
