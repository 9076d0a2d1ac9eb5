//! Capability interface for third-party format extractors.
//!
//! Sites that hide their media behind players or signed URLs can be
//! handed to an external tool. The coordinator only sees this trait, so
//! running without one is a configuration choice.

pub mod ytdlp;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::AppError;

pub use ytdlp::{YtDlpConfig, YtDlpExtractor};

/// A single format reported by an extractor
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFormat {
    pub format_id: String,
    pub extension: String,
    pub resolution: Option<String>,
    pub note: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}

impl ExtractedFormat {
    fn has_codec(codec: &Option<String>) -> bool {
        codec.as_deref().is_some_and(|c| !c.is_empty() && c != "none")
    }

    /// Carries both audio and video in a single file
    pub fn is_combined(&self) -> bool {
        Self::has_codec(&self.video_codec) && Self::has_codec(&self.audio_codec)
    }
}

/// A file produced by an extractor
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub file_name: String,
    pub data: Bytes,
}

#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Short name for logs and messages
    fn name(&self) -> &'static str;

    async fn list_formats(&self, url: &str) -> Result<Vec<ExtractedFormat>, AppError>;

    async fn fetch(&self, url: &str, format_id: &str) -> Result<ExtractedFile, AppError>;
}
