use super::backend::UploadBackend;
use super::notification::Notification;
use super::types::{FileStatus, Session, TrackedFile, UploadStatus, UploadedFile};
use crate::content_type::ContentType;
use crate::error::{Error, Result};
use futures::future::join_all;
use std::sync::mpsc::Sender;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_FILE_TIMEOUT: Duration = Duration::from_secs(60);

/// Progress reported once a file has been parsed and is being written.
const PARSED_PROGRESS: u8 = 50;

/// Aggregate result of one upload pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub uploaded: Vec<UploadedFile>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.uploaded.len()
    }

    pub fn failed(&self) -> usize {
        self.total - self.uploaded.len()
    }

    pub fn upload_ids(&self) -> Vec<Uuid> {
        self.uploaded.iter().map(|u| u.upload_id).collect()
    }

    pub fn notification(&self) -> Notification {
        match (self.succeeded(), self.failed()) {
            (0, _) => Notification::error(
                "Upload failed",
                format!("None of the {} file(s) could be uploaded.", self.total),
            ),
            (ok, 0) => Notification::success(
                "Upload complete",
                format!("Successfully uploaded {} file(s).", ok),
            ),
            (ok, failed) => Notification::success(
                "Upload complete",
                format!("Successfully uploaded {} file(s); {} failed.", ok, failed),
            ),
        }
    }
}

/// Drives staged files through parse and upload.
///
/// Every pending file is dispatched at once and the pass finishes when
/// all of them have settled. A failing file never affects its siblings.
pub struct UploadOrchestrator<B> {
    backend: B,
    file_timeout: Duration,
}

impl<B: UploadBackend> UploadOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            file_timeout: DEFAULT_FILE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, file_timeout: Duration) -> Self {
        self.file_timeout = file_timeout;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Uploads every file still in `uploading` state.
    ///
    /// Fails before touching the backend when there is no session or
    /// nothing to upload. Status changes are sent on `updates` keyed by
    /// file id.
    pub async fn run(
        &self,
        files: &[TrackedFile],
        content_type: ContentType,
        session: Option<&Session>,
        updates: &Sender<FileStatus>,
    ) -> Result<BatchReport> {
        let session = session.ok_or_else(|| {
            warn!("Upload refused: no authenticated user");
            Error::NotAuthenticated
        })?;

        let pending: Vec<&TrackedFile> = files
            .iter()
            .filter(|f| !f.status.is_terminal())
            .collect();
        if pending.is_empty() {
            warn!("Upload refused: no files selected");
            return Err(Error::NoFilesSelected);
        }

        info!(
            "Uploading {} {} file(s) for user {}",
            pending.len(),
            content_type,
            session.user_id
        );

        let slots: Vec<Option<UploadedFile>> = join_all(
            pending
                .iter()
                .map(|file| self.upload_one(file, content_type, session, updates)),
        )
        .await;

        let report = BatchReport {
            total: slots.len(),
            uploaded: slots.into_iter().flatten().collect(),
        };

        info!(
            "Upload pass finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }

    async fn upload_one(
        &self,
        file: &TrackedFile,
        content_type: ContentType,
        session: &Session,
        updates: &Sender<FileStatus>,
    ) -> Option<UploadedFile> {
        let result = tokio::time::timeout(
            self.file_timeout,
            self.process_file(file, content_type, session, updates),
        )
        .await
        .unwrap_or_else(|_| Err(Error::Timeout(self.file_timeout)));

        match result {
            Ok(uploaded) => {
                debug!(
                    "Uploaded {} ({} records)",
                    file.name, uploaded.record_count
                );
                send_status(updates, file, UploadStatus::Complete, 100, None);
                Some(uploaded)
            }
            Err(e) => {
                warn!("Failed to upload {}: {}", file.name, e);
                send_status(updates, file, UploadStatus::Error, 0, Some(e.to_string()));
                None
            }
        }
    }

    async fn process_file(
        &self,
        file: &TrackedFile,
        content_type: ContentType,
        session: &Session,
        updates: &Sender<FileStatus>,
    ) -> Result<UploadedFile> {
        let parsed = self.backend.parse_file(file).await?;
        send_status(updates, file, UploadStatus::Uploading, PARSED_PROGRESS, None);

        let record_count = self
            .backend
            .upload_records(&parsed, content_type, session)
            .await?;

        if let Err(e) = self
            .backend
            .save_upload_metadata(&file.name, content_type, record_count, session)
            .await
        {
            warn!("Could not record upload metadata for {}: {}", file.name, e);
        }

        Ok(UploadedFile {
            file_id: file.id,
            name: file.name.clone(),
            upload_id: Uuid::new_v4(),
            record_count,
        })
    }
}

fn send_status(
    updates: &Sender<FileStatus>,
    file: &TrackedFile,
    status: UploadStatus,
    progress: u8,
    error: Option<String>,
) {
    updates
        .send(FileStatus {
            id: file.id,
            name: file.name.clone(),
            status,
            progress,
            error,
        })
        .unwrap_or_default();
}
