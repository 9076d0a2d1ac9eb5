use std::path::PathBuf;
use std::sync::Arc;

use super::{fetcher::ensure_not_html, fetcher::ContentFetcher, inspector::UrlInspector};
use crate::{
    api::ApiClient,
    domain::{
        model::mime_for_extension, AppError, DownloadOption, DownloadRequest, DownloadedFile,
        InspectRequest, OptionKind,
    },
    extractor::{ExtractedFormat, MediaExtractor},
    utils::{derive_file_name, sanitize_filename},
};

/// Reject empty input and anything that is not http(s) before touching
/// the network
pub fn validate_url(url: &str) -> Result<&str, AppError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::EmptyUrl);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::InvalidScheme);
    }
    Ok(url)
}

fn extractor_option(url: &str, format: &ExtractedFormat) -> DownloadOption {
    let quality = format
        .resolution
        .as_deref()
        .or(format.note.as_deref())
        .unwrap_or("unknown quality");
    DownloadOption::yt_dlp(
        format!("{}: {} ({})", format.format_id, quality, format.extension),
        url,
        &format.extension,
        format.format_id.clone(),
    )
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    inspector: UrlInspector,
    fetcher: ContentFetcher,
    extractor: Option<Arc<dyn MediaExtractor>>,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient, extractor: Option<Arc<dyn MediaExtractor>>) -> Self {
        Self {
            inspector: UrlInspector::new(api_client.clone()),
            fetcher: ContentFetcher::new(api_client),
            extractor,
        }
    }

    pub fn has_extractor(&self) -> bool {
        self.extractor.is_some()
    }

    fn extractor(&self) -> Result<&Arc<dyn MediaExtractor>, AppError> {
        self.extractor.as_ref().ok_or(AppError::ExtractorUnavailable)
    }

    pub async fn inspect(&self, request: InspectRequest) -> Result<Vec<DownloadOption>, AppError> {
        let url = validate_url(&request.url)?;

        if !request.use_extractor {
            return self.inspector.inspect(url).await;
        }

        let extractor = self.extractor()?;
        let formats = extractor.list_formats(url).await?;
        let options: Vec<DownloadOption> = formats
            .iter()
            .filter(|f| f.is_combined())
            .map(|f| extractor_option(url, f))
            .collect();

        if options.is_empty() {
            warn!(
                "{} returned {} formats for {}, none with both audio and video",
                extractor.name(),
                formats.len(),
                url
            );
            return Err(AppError::NoCombinedFormat);
        }
        Ok(options)
    }

    pub async fn download(&self, request: DownloadRequest) -> Result<DownloadedFile, AppError> {
        let source_url = validate_url(&request.source_url)?;
        let option = request.option;

        match option.kind {
            OptionKind::Direct | OptionKind::Hls => {
                let data = if option.kind == OptionKind::Hls {
                    self.fetcher.fetch_hls(&option.url).await?
                } else {
                    self.fetcher.fetch_direct(&option.url).await?
                };

                Ok(DownloadedFile {
                    file_name: derive_file_name(source_url, &option.extension),
                    mime: option.mime,
                    data,
                })
            }
            OptionKind::YtDlp => {
                let format_id = option.format_id.as_deref().ok_or_else(|| {
                    AppError::Unexpected(format!("option {:?} has no format id", option.label))
                })?;
                let extracted = self.extractor()?.fetch(&option.url, format_id).await?;
                let data = ensure_not_html(extracted.data)?;

                let file_name = sanitize_filename(&extracted.file_name);
                let mime = match file_name.rsplit_once('.') {
                    Some((_, ext)) => mime_for_extension(ext).to_string(),
                    None => option.mime,
                };

                Ok(DownloadedFile {
                    file_name,
                    mime,
                    data,
                })
            }
        }
    }

    pub async fn choose_save_path(&self, suggested_filename: String) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_file_name(&suggested_filename)
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    pub async fn save(&self, file: DownloadedFile, path: PathBuf) -> Result<PathBuf, AppError> {
        tokio::fs::write(&path, &file.data)
            .await
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        info!("Saved {} bytes to {}", file.data.len(), path.display());
        Ok(path)
    }
}
