use super::backend::UploadBackend;
use super::types::{ParsedFile, RecordBatch, Session, TrackedFile};
use crate::config::SupabaseConfig;
use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::template::{self, csv};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde_json::json;
use tracing::{debug, info};

const METADATA_TABLE: &str = "bulk_uploads";

/// Supabase-backed implementation of the upload collaborators.
///
/// CSV files become rows in the content type's table through the REST
/// API. Everything else is stored as an object in the configured bucket.
#[derive(Clone)]
pub struct SupabaseBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    storage_bucket: String,
}

impl SupabaseBackend {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            storage_bucket: config.storage_bucket.clone(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Each segment is percent-encoded, so `#`, `?` and spaces stay part
    /// of the object key.
    fn object_url(&self, session: &Session, file_name: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::Config(format!("Invalid Supabase URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::Config(format!("Supabase URL {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend([
                "storage",
                "v1",
                "object",
                self.storage_bucket.as_str(),
                session.user_id.as_str(),
                file_name,
            ]);
        Ok(url)
    }

    fn headers(&self, session: &Session, content_type: &'static str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("apikey"),
            header_value(&self.anon_key)?,
        );
        headers.insert(
            HeaderName::from_static("authorization"),
            header_value(&format!("Bearer {}", session.access_token))?,
        );
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static(content_type),
        );
        Ok(headers)
    }

    async fn insert_rows(
        &self,
        batch: &RecordBatch,
        content_type: ContentType,
        session: &Session,
    ) -> Result<usize> {
        check_columns(batch, content_type)?;

        let mut headers = self.headers(session, "application/json")?;
        headers.insert(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static("return=minimal"),
        );

        let response = self
            .client
            .post(self.rest_url(content_type.table()))
            .headers(headers)
            .json(&batch.to_json_rows())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "{} insert failed with status {}: {}",
                content_type.table(),
                status,
                body
            )));
        }

        info!("Inserted {} rows into {}", batch.len(), content_type.table());
        Ok(batch.len())
    }

    async fn store_object(
        &self,
        file_name: &str,
        bytes: &[u8],
        session: &Session,
    ) -> Result<usize> {
        let mut headers = self.headers(session, "application/octet-stream")?;
        headers.insert(
            HeaderName::from_static("x-upsert"),
            HeaderValue::from_static("true"),
        );

        let response = self
            .client
            .post(self.object_url(session, file_name)?)
            .headers(headers)
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "storage upload of {} failed with status {}: {}",
                file_name, status, body
            )));
        }

        info!("Stored {} in bucket {}", file_name, self.storage_bucket);
        Ok(1)
    }
}

impl UploadBackend for SupabaseBackend {
    async fn parse_file(&self, file: &TrackedFile) -> Result<ParsedFile> {
        let path = file
            .path
            .as_ref()
            .ok_or_else(|| Error::Parse(format!("{} has no readable path", file.name)))?;

        match file.extension().as_deref() {
            Some("csv") => {
                let text = tokio::fs::read_to_string(path).await?;
                let batch = parse_records(&text)?;
                debug!("Parsed {} rows from {}", batch.len(), file.name);
                Ok(ParsedFile::Records(batch))
            }
            Some(ext @ ("xlsx" | "xls")) => Err(Error::UnsupportedFormat(format!(
                "{} spreadsheets must be exported to CSV first",
                ext
            ))),
            _ => Ok(ParsedFile::Object {
                file_name: file.name.clone(),
                bytes: tokio::fs::read(path).await?,
            }),
        }
    }

    async fn upload_records(
        &self,
        parsed: &ParsedFile,
        content_type: ContentType,
        session: &Session,
    ) -> Result<usize> {
        match parsed {
            ParsedFile::Records(batch) => self.insert_rows(batch, content_type, session).await,
            ParsedFile::Object { file_name, bytes } => {
                self.store_object(file_name, bytes, session).await
            }
        }
    }

    async fn save_upload_metadata(
        &self,
        file_name: &str,
        content_type: ContentType,
        record_count: usize,
        session: &Session,
    ) -> Result<()> {
        let payload = json!({
            "file_name": file_name,
            "content_type": content_type,
            "record_count": record_count,
            "user_id": session.user_id,
        });

        let response = self
            .client
            .post(self.rest_url(METADATA_TABLE))
            .headers(self.headers(session, "application/json")?)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Upload(format!(
                "metadata write failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("Invalid header value: {}", e)))
}

/// Splits CSV text into a header and data rows of equal width.
pub fn parse_records(text: &str) -> Result<RecordBatch> {
    let mut records = csv::parse_document(text)?.into_iter();
    let headers: Vec<String> = records
        .next()
        .ok_or_else(|| Error::Parse("file is empty".to_string()))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, row) in records.enumerate() {
        if row.len() != headers.len() {
            return Err(Error::Parse(format!(
                "row {} has {} fields, expected {}",
                index + 2,
                row.len(),
                headers.len()
            )));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(Error::Parse("file has no data rows".to_string()));
    }

    Ok(RecordBatch { headers, rows })
}

/// Every template column must be present, in any order and case.
fn check_columns(batch: &RecordBatch, content_type: ContentType) -> Result<()> {
    let present: Vec<String> = batch.headers.iter().map(|h| h.to_lowercase()).collect();
    let missing: Vec<String> = template::header_columns(content_type.key())
        .into_iter()
        .filter(|h| !present.contains(&h.to_lowercase()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Parse(format!(
            "missing columns for {}: {}",
            content_type.display_name(),
            missing.join(", ")
        )))
    }
}
