//! CSV templates per content type.
//!
//! The registry half answers "which columns does this content type
//! expect", the generator half turns that into a downloadable document.
//! Lookups take raw keys so callers holding an unvalidated string still
//! get the generic fallback instead of an error.

pub mod csv;

use crate::content_type::ContentType;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TEMPLATE_MIME: &str = "text/csv;charset=utf-8";

const FALLBACK_HEADERS: &[&str] = &["Title", "Content", "Type", "Description"];
const FALLBACK_SAMPLE: &[&str] = &[
    "Sample Title",
    "Sample content, written in plain text",
    "general",
    "A short description of the item",
];
const GENERIC_TEMPLATE: &str = "generic_template.csv";

pub fn header_columns(content_type: &str) -> Vec<String> {
    let headers = match ContentType::parse(content_type) {
        Some(ct) => ct.spec().headers,
        None => FALLBACK_HEADERS,
    };
    headers.iter().map(|h| h.to_string()).collect()
}

pub fn sample_row(content_type: &str) -> Vec<String> {
    let sample = match ContentType::parse(content_type) {
        Some(ct) => ct.spec().sample,
        None => FALLBACK_SAMPLE,
    };
    sample.iter().map(|v| v.to_string()).collect()
}

/// Checks that every sample row lines up with its header.
pub fn validate_registry() -> Result<()> {
    let entries = ContentType::ALL
        .iter()
        .map(|ct| (ct.key(), ct.spec().headers, ct.spec().sample))
        .chain(std::iter::once((
            "fallback",
            FALLBACK_HEADERS,
            FALLBACK_SAMPLE,
        )));

    for (key, headers, sample) in entries {
        if headers.is_empty() {
            return Err(Error::InvalidTemplate {
                content_type: key.to_string(),
                reason: "no header columns".to_string(),
            });
        }
        if headers.len() != sample.len() {
            return Err(Error::InvalidTemplate {
                content_type: key.to_string(),
                reason: format!(
                    "{} header columns but {} sample fields",
                    headers.len(),
                    sample.len()
                ),
            });
        }
    }

    debug!(
        "Template registry validated: {} content types",
        ContentType::ALL.len()
    );
    Ok(())
}

pub fn template_file_name(content_type: &str) -> String {
    format!("{}_template.csv", content_type)
}

/// Where a published template lives under `base`. Types without a
/// pre-built file point at the generic template.
pub fn resolve_template_url(base: &str, content_type: &str) -> String {
    let base = base.trim_end_matches('/');
    match ContentType::parse(content_type) {
        Some(ct) if ct.spec().static_template => {
            format!("{}/templates/{}", base, template_file_name(ct.key()))
        }
        _ => format!("{}/templates/{}", base, GENERIC_TEMPLATE),
    }
}

pub fn build_csv_template(content_type: &str) -> String {
    let headers = header_columns(content_type);
    let sample = sample_row(content_type);
    format!("{}\n{}", csv::join_record(&headers), csv::join_record(&sample))
}

/// Writes the template for `content_type` to `target`.
///
/// When `target` is a directory the conventional file name is used.
pub fn save_template(content_type: &str, target: &Path) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(template_file_name(content_type))
    } else {
        target.to_path_buf()
    };

    fs::write(&path, build_csv_template(content_type))?;
    info!("Saved {} template to {}", content_type, path.display());
    Ok(path)
}
