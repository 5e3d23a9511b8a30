use super::types::{ParsedFile, Session, TrackedFile};
use crate::content_type::ContentType;
use crate::error::Result;

/// The external calls the orchestrator sequences for each file.
///
/// Implementations decide how files are parsed and where records go; the
/// orchestrator only observes pass or fail.
#[allow(async_fn_in_trait)]
pub trait UploadBackend {
    async fn parse_file(&self, file: &TrackedFile) -> Result<ParsedFile>;

    /// Persists parsed contents and returns how many records were written.
    async fn upload_records(
        &self,
        parsed: &ParsedFile,
        content_type: ContentType,
        session: &Session,
    ) -> Result<usize>;

    /// Audit entry for a finished upload. Failures here never fail the file.
    async fn save_upload_metadata(
        &self,
        file_name: &str,
        content_type: ContentType,
        record_count: usize,
        session: &Session,
    ) -> Result<()>;
}
