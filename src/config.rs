//! Uploader configuration.
//!
//! Settings come from a TOML file; anything the file leaves out falls
//! back to the built-in defaults below. Command-line flags and
//! environment variables are applied on top by `main`.
//!
//! ```toml
//! [supabase]
//! url = "https://project.supabase.co"
//! anon_key = "..."
//!
//! [session]
//! user_id = "..."
//! access_token = "..."
//!
//! [upload]
//! max_files = 5
//! timeout_secs = 60
//! over_limit = "truncate"   # or "reject"
//!
//! [logging]
//! level = "info"
//! ```

use crate::error::{Error, Result};
use crate::intake::{OverLimitPolicy, DEFAULT_MAX_FILES};
use crate::upload::{Session, DEFAULT_FILE_TIMEOUT};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub supabase: SupabaseConfig,

    /// Signed-in user. Without one every upload is refused.
    #[serde(default)]
    pub session: Option<SessionConfig>,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// File the settings were read from, `None` when running on defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default = "default_supabase_url")]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,

    /// Bucket for files that are stored rather than parsed
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub user_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Per-file limit; an expired file ends in the error state
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub over_limit: OverLimitPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_supabase_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_storage_bucket() -> String {
    "bulk-uploads".to_string()
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_timeout_secs() -> u64 {
    DEFAULT_FILE_TIMEOUT.as_secs()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: default_supabase_url(),
            anon_key: String::new(),
            storage_bucket: default_storage_bucket(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            timeout_secs: default_timeout_secs(),
            over_limit: OverLimitPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.upload.max_files == 0 {
            return Err(Error::Config("upload.max_files must be at least 1".to_string()));
        }
        if self.upload.timeout_secs == 0 {
            return Err(Error::Config(
                "upload.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.supabase.url.trim().is_empty() {
            return Err(Error::Config("supabase.url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn session(&self) -> Option<Session> {
        self.session
            .as_ref()
            .filter(|s| !s.user_id.is_empty() && !s.access_token.is_empty())
            .map(|s| Session {
                user_id: s.user_id.clone(),
                access_token: s.access_token.clone(),
            })
    }

    pub fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.upload.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.upload.max_files, 5);
        assert_eq!(config.file_timeout(), Duration::from_secs(60));
        assert_eq!(config.upload.over_limit, OverLimitPolicy::Truncate);
        assert_eq!(config.logging.level, "info");
        assert!(config.session().is_none());
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(
            r#"
            [supabase]
            url = "https://owlet.supabase.co"
            anon_key = "anon"

            [session]
            user_id = "teacher-7"
            access_token = "jwt"

            [upload]
            max_files = 10
            over_limit = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(config.supabase.storage_bucket, "bulk-uploads");
        assert_eq!(config.upload.max_files, 10);
        assert_eq!(config.upload.over_limit, OverLimitPolicy::Reject);
        assert_eq!(config.session().unwrap().user_id, "teacher-7");
    }

    #[test]
    fn zero_max_files_is_rejected() {
        assert!(matches!(
            Config::from_toml("[upload]\nmax_files = 0\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn blank_session_counts_as_signed_out() {
        let config =
            Config::from_toml("[session]\nuser_id = \"\"\naccess_token = \"\"\n").unwrap();
        assert!(config.session().is_none());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("owlet.toml")).unwrap();
        assert_eq!(config.supabase.url, "http://localhost:54321");
        assert!(config.source.is_none());
    }

    #[test]
    fn loaded_file_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owlet.toml");
        fs::write(&path, "[upload]\nmax_files = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.upload.max_files, 3);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }
}
