//! Turns dropped or picked files into tracked upload records.

use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::upload::TrackedFile;
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_MAX_FILES: usize = 5;

/// What to do when a batch holds more files than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverLimitPolicy {
    /// Keep the first `max_files` and report how many were dropped
    #[default]
    Truncate,
    /// Refuse the whole batch
    Reject,
}

/// A platform file handle offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
    pub path: Option<PathBuf>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            path: None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .ok_or_else(|| Error::Parse(format!("Invalid filename: {}", path.display())))?
            .to_string_lossy()
            .to_string();

        Ok(Self {
            name,
            size: metadata.len(),
            path: Some(path.to_path_buf()),
        })
    }
}

#[derive(Debug, Default)]
pub struct IntakeOutcome {
    pub files: Vec<TrackedFile>,
    /// Names refused by the accept filter
    pub rejected: Vec<String>,
    /// Accepted candidates past `max_files` that were dropped
    pub truncated: usize,
}

impl IntakeOutcome {
    /// Message worth showing the user, if anything was left out.
    pub fn notice(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.truncated > 0 {
            parts.push(format!(
                "{} file(s) over the limit were not added",
                self.truncated
            ));
        }
        if !self.rejected.is_empty() {
            parts.push(format!(
                "unsupported file type: {}",
                self.rejected.join(", ")
            ));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileIntake {
    max_files: usize,
    /// Files already staged, counted against `max_files`
    staged: usize,
    policy: OverLimitPolicy,
    accept: Vec<Pattern>,
}

impl FileIntake {
    pub fn new(max_files: usize, policy: OverLimitPolicy) -> Self {
        Self {
            max_files,
            staged: 0,
            policy,
            accept: Vec::new(),
        }
    }

    pub fn for_content_type(
        content_type: ContentType,
        max_files: usize,
        policy: OverLimitPolicy,
    ) -> Self {
        Self::new(max_files, policy).with_accept(&content_type.accept_filter())
    }

    /// Restricts intake to a drop-zone style accept list such as
    /// `.csv,.xlsx`. An empty list accepts everything.
    pub fn with_accept(mut self, accept: &str) -> Self {
        self.accept = accept
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .filter_map(|ext| Pattern::new(&format!("*.{}", ext.trim_start_matches('.'))).ok())
            .collect();
        self
    }

    pub fn with_staged(mut self, staged: usize) -> Self {
        self.staged = staged;
        self
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// How many more files fit before the limit is reached.
    pub fn remaining(&self) -> usize {
        self.max_files.saturating_sub(self.staged)
    }

    pub fn accepts(&self, name: &str) -> bool {
        if self.accept.is_empty() {
            return true;
        }
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        self.accept.iter().any(|p| p.matches_with(name, options))
    }

    pub fn accept(&self, candidates: Vec<CandidateFile>) -> Result<IntakeOutcome> {
        let (mut accepted, rejected): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| self.accepts(&c.name));

        let remaining = self.remaining();
        let mut truncated = 0;
        if accepted.len() > remaining {
            match self.policy {
                OverLimitPolicy::Reject => {
                    return Err(Error::TooManyFiles {
                        selected: self.staged + accepted.len(),
                        max: self.max_files,
                    });
                }
                OverLimitPolicy::Truncate => {
                    truncated = accepted.len() - remaining;
                    warn!(
                        "Too many files selected ({} with {} staged), keeping the first {}",
                        accepted.len(),
                        self.staged,
                        remaining
                    );
                    accepted.truncate(remaining);
                }
            }
        }

        let files: Vec<TrackedFile> = accepted
            .into_iter()
            .map(|c| TrackedFile::new(c.name, c.size, c.path))
            .collect();
        debug!("Intake accepted {} file(s)", files.len());

        Ok(IntakeOutcome {
            files,
            rejected: rejected.into_iter().map(|c| c.name).collect(),
            truncated,
        })
    }
}

impl Default for FileIntake {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILES, OverLimitPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadStatus;
    use std::collections::HashSet;

    fn candidates(n: usize) -> Vec<CandidateFile> {
        (0..n)
            .map(|i| CandidateFile::new(format!("batch_{}.csv", i), 100 + i as u64))
            .collect()
    }

    #[test]
    fn truncates_to_max_files() {
        let outcome = FileIntake::default().accept(candidates(8)).unwrap();

        assert_eq!(outcome.files.len(), DEFAULT_MAX_FILES);
        assert_eq!(outcome.truncated, 3);
        assert!(outcome.notice().unwrap().contains("3 file(s)"));
        assert!(outcome
            .files
            .iter()
            .all(|f| f.status == UploadStatus::Uploading && f.progress == 0));

        let ids: HashSet<_> = outcome.files.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), DEFAULT_MAX_FILES);
        assert_eq!(outcome.files[0].name, "batch_0.csv");
        assert_eq!(outcome.files[4].name, "batch_4.csv");
    }

    #[test]
    fn reject_policy_refuses_batch() {
        let intake = FileIntake::new(2, OverLimitPolicy::Reject);
        match intake.accept(candidates(3)) {
            Err(Error::TooManyFiles { selected, max }) => {
                assert_eq!(selected, 3);
                assert_eq!(max, 2);
            }
            other => panic!("expected TooManyFiles, got {:?}", other),
        }
    }

    #[test]
    fn staged_files_use_up_the_limit() {
        let intake = FileIntake::default().with_staged(3);
        assert_eq!(intake.remaining(), 2);

        let outcome = intake.accept(candidates(4)).unwrap();
        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.truncated, 2);

        let full = FileIntake::default().with_staged(DEFAULT_MAX_FILES);
        let outcome = full.accept(candidates(1)).unwrap();
        assert!(outcome.files.is_empty());
        assert_eq!(outcome.truncated, 1);

        let strict = FileIntake::new(5, OverLimitPolicy::Reject).with_staged(4);
        match strict.accept(candidates(2)) {
            Err(Error::TooManyFiles { selected, max }) => {
                assert_eq!(selected, 6);
                assert_eq!(max, 5);
            }
            other => panic!("expected TooManyFiles, got {:?}", other),
        }
    }

    #[test]
    fn copies_name_and_size() {
        let outcome = FileIntake::default().accept(candidates(1)).unwrap();
        assert_eq!(outcome.files[0].size, 100);
        assert!(outcome.notice().is_none());
    }

    #[test]
    fn accept_filter_follows_content_type() {
        let intake = FileIntake::for_content_type(
            ContentType::QuizQuestions,
            DEFAULT_MAX_FILES,
            OverLimitPolicy::Truncate,
        );
        assert!(intake.accepts("quiz.csv"));
        assert!(intake.accepts("QUIZ.XLSX"));
        assert!(!intake.accepts("bundle.zip"));

        let outcome = intake
            .accept(vec![
                CandidateFile::new("quiz.csv", 1),
                CandidateFile::new("photo.png", 1),
            ])
            .unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.rejected, vec!["photo.png"]);
    }

    #[test]
    fn rejected_files_do_not_count_toward_limit() {
        let mut batch = candidates(5);
        batch.push(CandidateFile::new("notes.txt", 1));
        let intake = FileIntake::default().with_accept(".csv");

        let outcome = intake.accept(batch).unwrap();
        assert_eq!(outcome.files.len(), 5);
        assert_eq!(outcome.truncated, 0);
    }

    #[test]
    fn unrestricted_types_accept_anything() {
        let intake = FileIntake::for_content_type(
            ContentType::UploadActivities,
            DEFAULT_MAX_FILES,
            OverLimitPolicy::Truncate,
        );
        assert!(intake.accepts("drawing.jpg"));
        assert!(intake.accepts("Makefile"));
    }

    #[test]
    fn from_path_reads_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.csv");
        fs::write(&path, "Word\nowl\n").unwrap();

        let candidate = CandidateFile::from_path(&path).unwrap();
        assert_eq!(candidate.name, "words.csv");
        assert_eq!(candidate.size, 9);
        assert_eq!(candidate.path.as_deref(), Some(path.as_path()));
    }
}
