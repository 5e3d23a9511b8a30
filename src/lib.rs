//! Guardian Owlet bulk uploader.
//!
//! Stages learning-content files, uploads them to the Supabase backend
//! and generates per-content-type CSV templates.

pub mod app;
pub mod config;
pub mod content_type;
pub mod error;
pub mod intake;
pub mod store;
pub mod template;
pub mod upload;
pub mod utils;

pub use error::{Error, Result};
