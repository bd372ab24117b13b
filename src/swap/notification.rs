use crate::errors::SwapAppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// One user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn success(title: &str, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn error(err: &SwapAppError) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: err.title().to_string(),
            description: err.to_string(),
        }
    }
}
