mod backend;
mod notification;
mod orchestrator;
mod supabase;
mod types;

pub use backend::UploadBackend;
pub use notification::{Notification, NotificationLevel};
pub use orchestrator::{BatchReport, UploadOrchestrator, DEFAULT_FILE_TIMEOUT};
pub use supabase::{parse_records, SupabaseBackend};
pub use types::{
    column_key, FileStatus, ParsedFile, RecordBatch, Session, TrackedFile, UploadStatus,
    UploadedFile,
};
