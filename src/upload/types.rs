use crate::error::Error;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of a staged file within one upload pass.
///
/// `Complete` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploading,
    Complete,
    Error,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, UploadStatus::Uploading)
    }

    pub fn label(self) -> &'static str {
        match self {
            UploadStatus::Uploading => "Uploading",
            UploadStatus::Complete => "Complete",
            UploadStatus::Error => "Error",
        }
    }
}

/// One file staged for upload. `name`, `size` and `path` never change
/// after intake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub path: Option<PathBuf>,
    pub status: UploadStatus,
    /// Percentage, 0-100
    pub progress: u8,
}

impl TrackedFile {
    pub fn new(name: impl Into<String>, size: u64, path: Option<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            size,
            path,
            status: UploadStatus::Uploading,
            progress: 0,
        }
    }

    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Status change for a single tracked file, keyed by its id.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatus {
    pub id: Uuid,
    pub name: String,
    pub status: UploadStatus,
    pub progress: u8,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    pub file_id: Uuid,
    pub name: String,
    pub upload_id: Uuid,
    pub record_count: usize,
}

/// Authenticated user on whose behalf uploads are made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

impl FromStr for Session {
    type Err = Error;

    /// Parses `user_id:access_token`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (user_id, access_token) = s
            .split_once(':')
            .filter(|(u, t)| !u.is_empty() && !t.is_empty())
            .ok_or_else(|| Error::Config("session must be user_id:access_token".to_string()))?;
        Ok(Session {
            user_id: user_id.to_string(),
            access_token: access_token.to_string(),
        })
    }
}

/// Tabular contents of one upload file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON objects keyed by header.
    pub fn to_json_rows(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row.iter())
                    .map(|(h, v)| (column_key(h), serde_json::Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }
}

/// Header text to database column, e.g. `Option A` -> `option_a`.
pub fn column_key(header: &str) -> String {
    let mut key = String::with_capacity(header.len());
    for ch in header.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            key.push(ch.to_ascii_lowercase());
        } else if !key.ends_with('_') && !key.is_empty() {
            key.push('_');
        }
    }
    key.trim_end_matches('_').to_string()
}

/// What parsing a file produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFile {
    Records(RecordBatch),
    /// Opaque payload stored as-is (document bundles, media)
    Object { file_name: String, bytes: Vec<u8> },
}
