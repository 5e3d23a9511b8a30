use crate::error::Result;
use crate::store::FileStore;
use crate::upload::{BatchReport, FileStatus, Notification, UploadStatus};
use derivative::Derivative;
use std::sync::mpsc::Receiver;
use tracing::error;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionProgress {
    NotStarted,
    Uploading {
        total: usize,
        successful: usize,
        failed: usize,
    },
    Completed {
        total: usize,
        successful: usize,
        failed: usize,
    },
}

impl Default for ActionProgress {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct UploadState {
    pub progress: ActionProgress,
    pub files: FileStore,
    pub notifications: Vec<Notification>,
    pub upload_ids: Vec<Uuid>,
    pub is_uploading: bool,
    #[derivative(Debug = "ignore")]
    pub status_receiver: Option<Receiver<FileStatus>>,
    #[derivative(Debug = "ignore")]
    pub report_receiver: Option<Receiver<Result<BatchReport>>>,
}

impl UploadState {
    /// Drops staged files and progress. Toasts stay until dismissed.
    pub fn clear(&mut self) {
        self.files.clear();
        self.progress = ActionProgress::NotStarted;
        self.upload_ids.clear();
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn begin(&mut self, total: usize) {
        self.is_uploading = true;
        self.progress = ActionProgress::Uploading {
            total,
            successful: 0,
            failed: 0,
        };
    }

    pub fn apply_status(&mut self, update: FileStatus) {
        self.files.apply(&update);

        if let ActionProgress::Uploading {
            successful, failed, ..
        } = &mut self.progress
        {
            match update.status {
                UploadStatus::Complete => *successful += 1,
                UploadStatus::Error => *failed += 1,
                UploadStatus::Uploading => {}
            }
        }
    }

    /// Settles the batch once the worker reports back.
    pub fn finish(&mut self, result: Result<BatchReport>) {
        self.is_uploading = false;
        self.status_receiver = None;
        self.report_receiver = None;

        match result {
            Ok(report) => {
                self.progress = ActionProgress::Completed {
                    total: report.total,
                    successful: report.succeeded(),
                    failed: report.failed(),
                };
                self.upload_ids = report.upload_ids();
                self.notify(report.notification());
            }
            Err(e) => {
                error!("Upload batch failed: {}", e);
                self.progress = ActionProgress::NotStarted;
                self.notify(Notification::from_error(&e));
            }
        }
    }

    pub fn get_progress_percentage(&self) -> f32 {
        match &self.progress {
            ActionProgress::NotStarted => 0.0,
            ActionProgress::Uploading {
                total,
                successful,
                failed,
            } => {
                if *total == 0 {
                    0.0
                } else {
                    (*successful + *failed) as f32 / *total as f32
                }
            }
            ActionProgress::Completed { total, .. } => {
                if *total == 0 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    pub fn get_status_text(&self) -> String {
        match &self.progress {
            ActionProgress::NotStarted => String::new(),
            ActionProgress::Uploading {
                total,
                successful,
                failed,
            } => format!(
                "Uploading {}/{} files | Success: {} | Failed: {}",
                successful + failed,
                total,
                successful,
                failed
            ),
            ActionProgress::Completed {
                total,
                successful,
                failed,
            } => format!(
                "Finished {} files | Success: {} | Failed: {}",
                total, successful, failed
            ),
        }
    }
}
