use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tokio::process::Command;

use super::{ExtractedFile, ExtractedFormat, MediaExtractor};
use crate::domain::AppError;

#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    pub binary: PathBuf,
    pub socket_timeout: Duration,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            socket_timeout: Duration::from_secs(30),
        }
    }
}

/// Subset of `yt-dlp --dump-single-json` output
#[derive(Debug, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    #[serde(default)]
    ext: String,
    vcodec: Option<String>,
    acodec: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    resolution: Option<String>,
    format_note: Option<String>,
}

impl From<RawFormat> for ExtractedFormat {
    fn from(raw: RawFormat) -> Self {
        let resolution = match (raw.width, raw.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{}x{}", w, h)),
            _ => raw.resolution,
        };

        Self {
            format_id: raw.format_id,
            extension: raw.ext,
            resolution,
            note: raw.format_note,
            video_codec: raw.vcodec,
            audio_codec: raw.acodec,
        }
    }
}

fn parse_formats(json: &[u8]) -> Result<Vec<ExtractedFormat>, AppError> {
    let info: VideoInfo = serde_json::from_slice(json)
        .map_err(|e| AppError::Unexpected(format!("Could not parse yt-dlp output: {}", e)))?;
    Ok(info.formats.into_iter().map(ExtractedFormat::from).collect())
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("yt-dlp exited with an error")
        .trim()
        .to_string()
}

/// Extractor backed by the `yt-dlp` executable
#[derive(Debug, Clone, Default)]
pub struct YtDlpExtractor {
    config: YtDlpConfig,
}

impl YtDlpExtractor {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    /// Check if the configured binary can be executed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(["--no-warnings", "--no-playlist", "--socket-timeout"])
            .arg(self.config.socket_timeout.as_secs().to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: Command) -> Result<Vec<u8>, AppError> {
        let output = cmd.output().await.map_err(|e| {
            AppError::Unexpected(format!(
                "Failed to run {}: {}",
                self.config.binary.display(),
                e
            ))
        })?;

        if !output.status.success() {
            return Err(AppError::DownloadFailed(stderr_tail(&output.stderr)));
        }
        Ok(output.stdout)
    }
}

async fn find_output_file(dir: &Path) -> Result<PathBuf, AppError> {
    let io_err = |e: std::io::Error| AppError::Io(e.to_string());

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.ends_with(".part") || name.ends_with(".ytdl") || name.starts_with('.') {
            continue;
        }
        if entry.file_type().await.map_err(io_err)?.is_file() {
            return Ok(path);
        }
    }

    Err(AppError::DownloadFailed(
        "yt-dlp finished without producing a file".to_string(),
    ))
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn list_formats(&self, url: &str) -> Result<Vec<ExtractedFormat>, AppError> {
        info!("Listing formats for {} with yt-dlp", url);

        let mut cmd = self.command();
        cmd.args(["--dump-single-json", "--skip-download"]).arg(url);
        let stdout = self.run(cmd).await.map_err(|e| match e {
            AppError::DownloadFailed(msg) => AppError::FetchError(msg),
            other => other,
        })?;

        let formats = parse_formats(&stdout)?;
        debug!("yt-dlp reported {} formats", formats.len());
        Ok(formats)
    }

    async fn fetch(&self, url: &str, format_id: &str) -> Result<ExtractedFile, AppError> {
        // Removed on drop, whichever way this function returns
        let workdir = tempfile::Builder::new()
            .prefix("video-download-")
            .tempdir()
            .map_err(|e| AppError::Io(format!("Failed to create temp directory: {}", e)))?;

        info!(
            "Downloading format {} of {} into {}",
            format_id,
            url,
            workdir.path().display()
        );

        let template = workdir.path().join("%(title).200B.%(ext)s");
        let mut cmd = self.command();
        cmd.arg("-f")
            .arg(format_id)
            .arg("-o")
            .arg(&template)
            .arg(url)
            .stdout(Stdio::null());
        self.run(cmd).await?;

        let path = find_output_file(workdir.path()).await?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        Ok(ExtractedFile {
            file_name,
            data: Bytes::from(data),
        })
    }
}
