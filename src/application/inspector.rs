use url::Url;

use super::{fetch_error, link_extractor::extract_links};
use crate::api::ApiClient;
use crate::domain::{AppError, DownloadOption, Playlist};
use crate::utils::url_extension;

const DEFAULT_EXTENSION: &str = "mp4";

fn is_m3u8_path(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".m3u8")
}

/// Classifies a URL as playlist, page or media file and lists what can be
/// downloaded from it
#[derive(Clone)]
pub struct UrlInspector {
    client: ApiClient,
}

impl UrlInspector {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn inspect(&self, url: &str) -> Result<Vec<DownloadOption>, AppError> {
        let requested = Url::parse(url).map_err(|e| AppError::FetchError(e.to_string()))?;
        let probe = self.client.probe(url).await.map_err(fetch_error)?;
        debug!(
            "Probe of {}: status {}, content type {:?}",
            url, probe.status, probe.content_type
        );

        if probe.is_playlist() || is_m3u8_path(&requested) || is_m3u8_path(&probe.final_url) {
            return self.inspect_playlist(url).await;
        }

        if probe.is_html() {
            return self.inspect_page(url).await;
        }

        let extension = url_extension(&requested).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        info!("Treating {} as a direct {} file", url, extension);
        Ok(vec![DownloadOption::direct(
            format!("Original ({})", extension),
            url,
            &extension,
        )])
    }

    async fn inspect_playlist(&self, url: &str) -> Result<Vec<DownloadOption>, AppError> {
        let (final_url, text) = self.client.fetch_text(url).await.map_err(fetch_error)?;

        let options = match Playlist::parse(&text, &final_url) {
            Playlist::Master(variants) => variants
                .into_iter()
                .map(|variant| {
                    let label = match &variant.resolution {
                        Some(resolution) => format!("HLS {}", resolution),
                        None => "HLS (unknown resolution)".to_string(),
                    };
                    DownloadOption::hls(label, variant.uri.as_str())
                })
                .collect(),
            Playlist::Media(_) => Vec::new(),
        };

        if options.is_empty() {
            info!("No variant streams in {}, offering the whole playlist", url);
            return Ok(vec![DownloadOption::hls("HLS (whole playlist)", url)]);
        }

        info!("Found {} variant streams in {}", options.len(), url);
        Ok(options)
    }

    async fn inspect_page(&self, url: &str) -> Result<Vec<DownloadOption>, AppError> {
        let (final_url, html) = self.client.fetch_text(url).await.map_err(fetch_error)?;

        let options = extract_links(&html, &final_url);
        if options.is_empty() {
            return Err(AppError::NoLinksFound);
        }

        info!("Found {} media links on {}", options.len(), final_url);
        Ok(options)
    }
}
