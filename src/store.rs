//! The staged file list and its four mutations.

use crate::upload::{FileStatus, TrackedFile, UploadStatus};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub uploading: usize,
    pub complete: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FileStore {
    files: Vec<TrackedFile>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, files: impl IntoIterator<Item = TrackedFile>) {
        let before = self.files.len();
        self.files.extend(files);
        debug!("Staged {} file(s)", self.files.len() - before);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<TrackedFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Applies a status change. Returns `false` when no file has `id`,
    /// e.g. because it was removed while its upload was in flight.
    pub fn update_status(&mut self, id: Uuid, status: UploadStatus, progress: u8) -> bool {
        match self.files.iter_mut().find(|f| f.id == id) {
            Some(file) => {
                file.status = status;
                file.progress = progress.min(100);
                true
            }
            None => {
                debug!("Ignoring status update for unknown file {}", id);
                false
            }
        }
    }

    pub fn apply(&mut self, update: &FileStatus) -> bool {
        self.update_status(update.id, update.status, update.progress)
    }

    pub fn files(&self) -> &[TrackedFile] {
        &self.files
    }

    pub fn get(&self, id: Uuid) -> Option<&TrackedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn pending(&self) -> Vec<TrackedFile> {
        self.files
            .iter()
            .filter(|f| !f.status.is_terminal())
            .cloned()
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for file in &self.files {
            match file.status {
                UploadStatus::Uploading => counts.uploading += 1,
                UploadStatus::Complete => counts.complete += 1,
                UploadStatus::Error => counts.error += 1,
            }
        }
        counts
    }
}
