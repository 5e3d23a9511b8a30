//! Error types for the bulk uploader.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport errors talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed upload file contents
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Backend rejected an upload
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Too many files: {selected} selected, at most {max} allowed")]
    TooManyFiles { selected: usize, max: usize },

    /// Template sample row does not line up with its header
    #[error("Invalid template for {content_type}: {reason}")]
    InvalidTemplate {
        content_type: String,
        reason: String,
    },

    #[error("No files selected")]
    NoFilesSelected,

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
