use std::fmt;

use bytes::Bytes;

/// Extension and MIME type used for everything delivered over HLS.
/// Segments are concatenated as raw transport stream, so no other
/// container is valid for that output.
pub const HLS_EXTENSION: &str = "ts";
pub const DEFAULT_MIME: &str = "video/mp4";

const MIME_MAP: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("ts", "video/mp2t"),
];

/// Map a file extension to a MIME type, falling back to `video/mp4`.
pub fn mime_for_extension(extension: &str) -> &'static str {
    MIME_MAP
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Direct,
    Hls,
    YtDlp,
}

/// One downloadable variant discovered for a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOption {
    pub label: String,
    pub url: String,
    pub extension: String,
    pub mime: String,
    pub kind: OptionKind,
    pub format_id: Option<String>,
}

impl DownloadOption {
    pub fn direct(label: impl Into<String>, url: impl Into<String>, extension: &str) -> Self {
        let extension = extension.to_ascii_lowercase();
        Self {
            label: label.into(),
            url: url.into(),
            mime: mime_for_extension(&extension).to_string(),
            extension,
            kind: OptionKind::Direct,
            format_id: None,
        }
    }

    pub fn hls(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            extension: HLS_EXTENSION.to_string(),
            mime: mime_for_extension(HLS_EXTENSION).to_string(),
            kind: OptionKind::Hls,
            format_id: None,
        }
    }

    pub fn yt_dlp(
        label: impl Into<String>,
        url: impl Into<String>,
        extension: &str,
        format_id: impl Into<String>,
    ) -> Self {
        let extension = extension.to_ascii_lowercase();
        Self {
            label: label.into(),
            url: url.into(),
            mime: mime_for_extension(&extension).to_string(),
            extension,
            kind: OptionKind::YtDlp,
            format_id: Some(format_id.into()),
        }
    }
}

// pick_list renders options through Display
impl fmt::Display for DownloadOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone)]
pub struct InspectRequest {
    pub url: String,
    pub use_extractor: bool,
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// URL the user inspected; used to derive the file name
    pub source_url: String,
    pub option: DownloadOption,
}

/// Bytes ready to be saved locally
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub file_name: String,
    pub mime: String,
    pub data: Bytes,
}

impl DownloadedFile {
    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_table() {
        assert_eq!(mime_for_extension("mov"), "video/quicktime");
        assert_eq!(mime_for_extension("MKV"), "video/x-matroska");
        assert_eq!(mime_for_extension("webm"), "video/mp4");
        assert_eq!(mime_for_extension(""), "video/mp4");
    }

    #[test]
    fn test_hls_option_is_always_transport_stream() {
        let option = DownloadOption::hls("HLS 1280x720", "https://cdn.example.com/720p.m3u8");
        assert_eq!(option.kind, OptionKind::Hls);
        assert_eq!(option.extension, "ts");
        assert_eq!(option.mime, "video/mp2t");
        assert!(option.format_id.is_none());
    }

    #[test]
    fn test_direct_option_lowercases_extension() {
        let option = DownloadOption::direct("Original (AVI)", "https://a.example/clip.AVI", "AVI");
        assert_eq!(option.extension, "avi");
        assert_eq!(option.mime, "video/x-msvideo");
        assert_eq!(option.to_string(), "Original (AVI)");
    }
}
