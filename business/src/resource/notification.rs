//! Toast notifications produced by table operations.

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A message the UI shows once and then discards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        info!("{message}");
        Self {
            level: NotificationLevel::Success,
            message,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        let message = message.into();
        info!("{message}");
        Self {
            level: NotificationLevel::Info,
            message,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("{message}");
        Self {
            level: NotificationLevel::Error,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
