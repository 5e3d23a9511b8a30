use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// User-facing toast for a finished (or refused) batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Maps a batch-level failure to its toast. Preconditions get their
    /// own wording; anything else is a generic upload failure.
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::NoFilesSelected => {
                Self::error("No files selected", "Please select at least one file to upload.")
            }
            Error::NotAuthenticated => Self::error(
                "Authentication required",
                "You must be signed in to upload files.",
            ),
            Error::TooManyFiles { max, .. } => Self::error(
                "Too many files",
                format!("You can upload at most {} files at a time.", max),
            ),
            other => Self::error("Upload failed", other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
