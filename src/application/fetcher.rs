use bytes::{Bytes, BytesMut};

use super::download_error;
use crate::api::ApiClient;
use crate::domain::{AppError, Playlist};
use crate::utils::looks_like_html;

/// Retrieves the bytes behind a direct or HLS download option
#[derive(Clone)]
pub struct ContentFetcher {
    client: ApiClient,
}

impl ContentFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_direct(&self, url: &str) -> Result<Bytes, AppError> {
        info!("Downloading {}", url);
        let data = self.client.fetch_bytes(url).await.map_err(download_error)?;
        ensure_not_html(data)
    }

    /// Download every segment of a playlist in order and concatenate the
    /// bodies. Master playlists are followed to their highest-bandwidth
    /// variant first. Any failed segment discards the whole download.
    pub async fn fetch_hls(&self, playlist_url: &str) -> Result<Bytes, AppError> {
        let (mut base, text) = self
            .client
            .fetch_playlist(playlist_url)
            .await
            .map_err(download_error)?;
        let mut playlist = Playlist::parse(&text, &base);

        if let Some(variant) = playlist.best_variant().map(|v| v.uri.clone()) {
            info!("Following variant stream {}", variant);
            let (variant_base, text) = self
                .client
                .fetch_playlist(variant.as_str())
                .await
                .map_err(download_error)?;
            playlist = Playlist::parse(&text, &variant_base);
            base = variant_base;
        }

        let segments = match playlist {
            Playlist::Media(segments) if !segments.is_empty() => segments,
            Playlist::Media(_) => {
                return Err(AppError::DownloadFailed(format!(
                    "playlist {} has no segments",
                    base
                )))
            }
            Playlist::Master(_) => {
                return Err(AppError::DownloadFailed(format!(
                    "nested master playlist at {}",
                    base
                )))
            }
        };

        let total = segments.len();
        let mut buffer = BytesMut::new();
        for (index, segment) in segments.iter().enumerate() {
            debug!("Segment {}/{}: {}", index + 1, total, segment);
            let body = self
                .client
                .fetch_bytes(segment.as_str())
                .await
                .map_err(download_error)?;
            buffer.extend_from_slice(&body);
        }

        info!("Joined {} segments, {} bytes", total, buffer.len());
        ensure_not_html(buffer.freeze())
    }
}

/// Reject error pages served with a success status
pub(crate) fn ensure_not_html(data: Bytes) -> Result<Bytes, AppError> {
    if looks_like_html(&data) {
        warn!("Payload of {} bytes is an HTML document", data.len());
        return Err(AppError::UnexpectedHtmlPayload);
    }
    Ok(data)
}
