//! Toast notifications
//!
//! Fire-and-forget: senders never wait and never fail, whether or not
//! anything is listening.

use crate::config::NotificationConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub message: String,
    /// How long the toast stays visible
    #[serde(rename = "durationMs", serialize_with = "as_millis")]
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

#[derive(Clone)]
pub struct NotificationService {
    sender: broadcast::Sender<Notification>,
    config: NotificationConfig,
}

impl NotificationService {
    pub fn new(config: NotificationConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self { sender, config }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn default_duration(&self, severity: Severity) -> Duration {
        let ms = match severity {
            Severity::Success => self.config.success_ms,
            Severity::Info => self.config.info_ms,
            Severity::Warning => self.config.warning_ms,
            Severity::Error => self.config.error_ms,
        };
        Duration::from_millis(ms)
    }

    /// Dispatch a toast and return it
    pub fn notify(
        &self,
        severity: Severity,
        message: impl Into<String>,
        duration: Duration,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            severity,
            message: message.into(),
            duration,
            created_at: Utc::now(),
        };
        // No receivers is fine
        let _ = self.sender.send(notification.clone());
        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.notify(Severity::Success, message, self.default_duration(Severity::Success))
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.notify(Severity::Info, message, self.default_duration(Severity::Info))
    }

    pub fn warning(&self, message: impl Into<String>) -> Notification {
        self.notify(Severity::Warning, message, self.default_duration(Severity::Warning))
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.notify(Severity::Error, message, self.default_duration(Severity::Error))
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}
