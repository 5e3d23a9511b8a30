mod state;
mod ui;

use crate::config::Config;
use crate::content_type::ContentType;
use crate::error::Error;
use crate::intake::{CandidateFile, FileIntake};
use crate::template;
use crate::upload::{Notification, Session, SupabaseBackend, UploadOrchestrator};
use crate::utils::walk::expand_paths;
use eframe::{egui, App};
pub use state::{ActionProgress, UploadState};
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct OwletUploader {
    config: Config,
    session: Option<Session>,
    content_type: ContentType,
    state: UploadState,
}

impl OwletUploader {
    pub fn new(config: Config, session: Option<Session>) -> Self {
        info!("Initializing Guardian Owlet bulk uploader");
        Self {
            config,
            session,
            content_type: ContentType::default(),
            state: UploadState::default(),
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        if content_type != self.content_type {
            info!("Content type changed to {}", content_type);
            self.content_type = content_type;
        }
    }

    fn intake(&self) -> FileIntake {
        FileIntake::for_content_type(
            self.content_type,
            self.config.upload.max_files,
            self.config.upload.over_limit,
        )
        .with_staged(self.state.files.len())
    }

    /// Stages dropped or picked paths. Directories are walked.
    pub fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let mut candidates = Vec::new();
        for path in expand_paths(paths) {
            match CandidateFile::from_path(&path) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => warn!("Cannot stage {}: {}", path.display(), e),
            }
        }
        self.add_candidates(candidates);
    }

    pub fn add_candidates(&mut self, candidates: Vec<CandidateFile>) {
        if self.state.is_uploading || candidates.is_empty() {
            return;
        }

        match self.intake().accept(candidates) {
            Ok(outcome) => {
                if let Some(notice) = outcome.notice() {
                    self.state
                        .notify(Notification::error("Some files were not added", notice));
                }
                self.state.files.add(outcome.files);
            }
            Err(e) => {
                warn!("Intake refused batch: {}", e);
                self.state.notify(Notification::from_error(&e));
            }
        }
    }

    pub fn remove_file(&mut self, id: Uuid) {
        if !self.state.is_uploading {
            self.state.files.remove(id);
        }
    }

    pub fn clear_files(&mut self) {
        if !self.state.is_uploading {
            self.state.clear();
        }
    }

    pub fn can_upload(&self) -> bool {
        !self.state.files.is_empty() && !self.state.is_uploading
    }

    /// Writes the current content type's template to `target`.
    pub fn download_template(&mut self, target: &Path) {
        match template::save_template(self.content_type.key(), target) {
            Ok(path) => self.state.notify(Notification::success(
                "Template saved",
                format!("Saved {}", path.display()),
            )),
            Err(e) => {
                warn!("Could not save template: {}", e);
                self.state
                    .notify(Notification::error("Could not save template", e.to_string()));
            }
        }
    }

    pub fn published_template_url(&self) -> String {
        template::resolve_template_url(&self.config.supabase.url, self.content_type.key())
    }

    pub fn start_upload(&mut self) {
        if self.state.is_uploading {
            return;
        }

        let files = self.state.files.pending();
        let content_type = self.content_type;
        let session = self.session.clone();
        let orchestrator = UploadOrchestrator::new(SupabaseBackend::new(&self.config.supabase))
            .with_timeout(self.config.file_timeout());

        let (status_sender, status_receiver) = std_mpsc::channel();
        let (report_sender, report_receiver) = std_mpsc::channel();
        self.state.status_receiver = Some(status_receiver);
        self.state.report_receiver = Some(report_receiver);
        self.state.begin(files.len());

        info!("Starting upload of {} file(s)", files.len());

        std::thread::spawn(move || {
            let result = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(async {
                    orchestrator
                        .run(&files, content_type, session.as_ref(), &status_sender)
                        .await
                }),
                Err(e) => Err(Error::Io(e)),
            };
            let _ = report_sender.send(result);
        });
    }

    /// Applies whatever the upload worker has sent since the last frame.
    /// Returns `true` when anything changed.
    pub fn poll_worker(&mut self) -> bool {
        let updates: Vec<_> = self
            .state
            .status_receiver
            .as_ref()
            .map(|receiver| receiver.try_iter().collect())
            .unwrap_or_default();
        let mut changed = !updates.is_empty();
        for update in updates {
            self.state.apply_status(update);
        }

        let finished = self
            .state
            .report_receiver
            .as_ref()
            .and_then(|receiver| receiver.try_recv().ok());
        if let Some(result) = finished {
            // status messages sent before the report are already queued
            if let Some(receiver) = self.state.status_receiver.take() {
                for update in receiver.try_iter() {
                    self.state.apply_status(update);
                }
            }
            self.state.finish(result);
            changed = true;
        }

        changed
    }

    pub fn dismiss_notification(&mut self, index: usize) {
        if index < self.state.notifications.len() {
            self.state.notifications.remove(index);
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.poll_worker() || self.state.is_uploading {
            ctx.request_repaint();
        }

        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.add_paths(dropped);
        }
    }
}

impl App for OwletUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{BatchReport, UploadStatus};

    fn app() -> OwletUploader {
        OwletUploader::new(Config::default(), None)
    }

    #[test]
    fn upload_disabled_until_files_staged() {
        let mut app = app();
        assert!(!app.can_upload());

        app.add_candidates(vec![CandidateFile::new("quiz.csv", 12)]);
        assert!(app.can_upload());

        app.state.begin(1);
        assert!(!app.can_upload());
    }

    #[test]
    fn over_limit_drop_leaves_a_notice() {
        let mut app = app();
        let batch = (0..7)
            .map(|i| CandidateFile::new(format!("q{}.csv", i), 1))
            .collect();
        app.add_candidates(batch);

        assert_eq!(app.state().files.len(), 5);
        assert_eq!(app.state().notifications.len(), 1);
    }

    #[test]
    fn limit_spans_separate_drops() {
        let mut app = app();
        let batch = |start: usize| {
            (start..start + 3)
                .map(|i| CandidateFile::new(format!("q{}.csv", i), 1))
                .collect::<Vec<_>>()
        };

        app.add_candidates(batch(0));
        assert!(app.state().notifications.is_empty());

        app.add_candidates(batch(3));
        assert_eq!(app.state().files.len(), 5);
        assert_eq!(app.state().notifications.len(), 1);

        app.add_candidates(batch(6));
        assert_eq!(app.state().files.len(), 5);
        assert_eq!(app.state().notifications.len(), 2);

        app.clear_files();
        app.add_candidates(batch(9));
        assert_eq!(app.state().files.len(), 3);
    }

    #[test]
    fn accept_filter_tracks_content_type() {
        let mut app = app();
        app.set_content_type(ContentType::StoryBooks);
        app.add_candidates(vec![
            CandidateFile::new("stories.zip", 1),
            CandidateFile::new("stories.csv", 1),
        ]);

        assert_eq!(app.state().files.len(), 1);
        assert_eq!(app.state().files.files()[0].name, "stories.zip");
    }

    #[test]
    fn remove_and_clear() {
        let mut app = app();
        app.add_candidates(vec![
            CandidateFile::new("a.csv", 1),
            CandidateFile::new("b.csv", 1),
        ]);
        let id = app.state().files.files()[0].id;

        app.remove_file(id);
        assert_eq!(app.state().files.len(), 1);

        app.clear_files();
        assert!(app.state().files.is_empty());
    }

    #[test]
    fn poll_applies_statuses_then_report() {
        let mut app = app();
        app.add_candidates(vec![CandidateFile::new("a.csv", 1)]);
        let file = app.state().files.files()[0].clone();

        let (status_tx, status_rx) = std_mpsc::channel();
        let (report_tx, report_rx) = std_mpsc::channel();
        app.state.status_receiver = Some(status_rx);
        app.state.report_receiver = Some(report_rx);
        app.state.begin(1);

        status_tx
            .send(crate::upload::FileStatus {
                id: file.id,
                name: file.name.clone(),
                status: UploadStatus::Error,
                progress: 0,
                error: Some("boom".into()),
            })
            .unwrap();
        report_tx
            .send(Ok(BatchReport {
                total: 1,
                uploaded: vec![],
            }))
            .unwrap();

        assert!(app.poll_worker());
        assert!(!app.state().is_uploading);
        assert_eq!(
            app.state().files.get(file.id).unwrap().status,
            UploadStatus::Error
        );
        assert!(app.state().notifications[0].is_error());
    }

    #[test]
    fn template_download_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.download_template(dir.path());

        assert!(dir.path().join("curriculum_questions_template.csv").exists());
        assert!(!app.state().notifications[0].is_error());
        assert!(app
            .published_template_url()
            .ends_with("/templates/curriculum_questions_template.csv"));
    }
}
