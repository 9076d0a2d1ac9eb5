use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("URL must start with http:// or https://")]
    InvalidScheme,

    #[error("Could not open the link: {0}")]
    FetchError(String),

    #[error("No video links were found on the page")]
    NoLinksFound,

    #[error(
        "No format with both audio and video was found. Merging separate audio and video \
         streams is not supported without an external muxing tool (ffmpeg)"
    )]
    NoCombinedFormat,

    #[error("The link returned an HTML page instead of a video. Check that it points to the file itself")]
    UnexpectedHtmlPayload,

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("External extractor is not available")]
    ExtractorUnavailable,

    #[error("Request error: {0}")]
    Request(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
