//! End-to-end upload pass: intake, store, orchestrator, notification.

use owlet_uploader::content_type::ContentType;
use owlet_uploader::intake::{CandidateFile, FileIntake, OverLimitPolicy};
use owlet_uploader::store::FileStore;
use owlet_uploader::template;
use owlet_uploader::upload::{
    parse_records, ParsedFile, Session, TrackedFile, UploadBackend, UploadOrchestrator,
    UploadStatus,
};
use owlet_uploader::{Error, Result};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::channel;
use std::sync::Mutex;

/// Parses real CSV files from disk and records what would be written.
#[derive(Default)]
struct RecordingBackend {
    inserted: Mutex<Vec<(String, usize)>>,
    metadata: AtomicUsize,
}

impl UploadBackend for RecordingBackend {
    async fn parse_file(&self, file: &TrackedFile) -> Result<ParsedFile> {
        let path = file
            .path
            .as_ref()
            .ok_or_else(|| Error::Parse("no path".into()))?;
        let text = fs::read_to_string(path)?;
        Ok(ParsedFile::Records(parse_records(&text)?))
    }

    async fn upload_records(
        &self,
        parsed: &ParsedFile,
        content_type: ContentType,
        _session: &Session,
    ) -> Result<usize> {
        let ParsedFile::Records(batch) = parsed else {
            return Err(Error::Upload("expected rows".into()));
        };
        self.inserted
            .lock()
            .unwrap()
            .push((content_type.table().to_string(), batch.len()));
        Ok(batch.len())
    }

    async fn save_upload_metadata(
        &self,
        _file_name: &str,
        _content_type: ContentType,
        _record_count: usize,
        _session: &Session,
    ) -> Result<()> {
        self.metadata.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn session() -> Session {
    Session {
        user_id: "admin-1".to_string(),
        access_token: "jwt".to_string(),
    }
}

#[tokio::test]
async fn template_round_trip_through_upload() {
    let dir = tempfile::tempdir().unwrap();
    let content_type = ContentType::CurriculumQuestions;

    // a filled-in template with two extra rows, plus one broken file
    let mut good = template::build_csv_template(content_type.key());
    good.push_str("\nScience,4,Plants,What do plants need?,Sun,Water,Air,All,D,\"Sun, water, and air\",easy");
    good.push_str("\nScience,4,Plants,Where are seeds?,Roots,Fruit,Leaves,Stem,B,Inside the fruit,medium");
    let good_path = dir.path().join("plants.csv");
    fs::write(&good_path, good).unwrap();

    let bad_path = dir.path().join("broken.csv");
    fs::write(&bad_path, "Subject,Grade\nScience\n").unwrap();

    let candidates = vec![
        CandidateFile::from_path(&good_path).unwrap(),
        CandidateFile::from_path(&bad_path).unwrap(),
    ];
    let outcome = FileIntake::for_content_type(content_type, 5, OverLimitPolicy::Truncate)
        .accept(candidates)
        .unwrap();

    let mut store = FileStore::new();
    store.add(outcome.files);
    let (tx, rx) = channel();

    let orchestrator = UploadOrchestrator::new(RecordingBackend::default());
    let report = orchestrator
        .run(store.files(), content_type, Some(&session()), &tx)
        .await
        .unwrap();
    for update in rx.try_iter() {
        store.apply(&update);
    }

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.uploaded[0].name, "plants.csv");
    assert_eq!(report.uploaded[0].record_count, 3);

    let inserted = orchestrator.backend().inserted.lock().unwrap().clone();
    assert_eq!(inserted, vec![("curriculum_questions".to_string(), 3)]);
    assert_eq!(orchestrator.backend().metadata.load(Ordering::SeqCst), 1);

    let files = store.files();
    assert_eq!(files[0].status, UploadStatus::Complete);
    assert_eq!(files[0].progress, 100);
    assert_eq!(files[1].status, UploadStatus::Error);
    assert_eq!(files[1].progress, 0);

    let note = report.notification();
    assert!(!note.is_error());
    assert!(note.message.contains("1 file(s); 1 failed"));
}

#[tokio::test]
async fn oversized_batch_uploads_only_the_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut candidates = Vec::new();
    for i in 0..7 {
        let path = dir.path().join(format!("words_{}.csv", i));
        fs::write(&path, template::build_csv_template("vocabulary_words")).unwrap();
        candidates.push(CandidateFile::from_path(&path).unwrap());
    }

    let outcome = FileIntake::default().accept(candidates).unwrap();
    assert_eq!(outcome.truncated, 2);

    let mut store = FileStore::new();
    store.add(outcome.files);
    let (tx, _rx) = channel();

    let report = UploadOrchestrator::new(RecordingBackend::default())
        .run(
            store.files(),
            ContentType::VocabularyWords,
            Some(&session()),
            &tx,
        )
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 5);
}
