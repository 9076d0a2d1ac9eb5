use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use thiserror::Error;
use url::Url;

use super::models::{ClientConfig, ProbeResponse};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

fn is_ok_probe_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// HEAD the URL, repeating as GET when the server answers 405.
    /// Only 200 and 206 count as success.
    pub async fn probe(&self, url: &str) -> Result<ProbeResponse> {
        let url = Url::parse(url)?;

        let mut response = self.client.head(url.clone()).send().await?;
        if response.status() == StatusCode::METHOD_NOT_ALLOWED {
            debug!("HEAD not allowed for {}, retrying with GET", url);
            response = self.client.get(url.clone()).send().await?;
        }

        let status = response.status();
        if !is_ok_probe_status(status) {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        Ok(ProbeResponse {
            final_url: response.url().clone(),
            status: status.as_u16(),
            content_type,
        })
    }

    /// Fetch a text document (HTML page or playlist) for inspection.
    /// Returns the URL after redirects together with the body.
    pub async fn fetch_text(&self, url: &str) -> Result<(Url, String)> {
        self.get_text(url, is_ok_probe_status).await
    }

    /// Fetch a playlist on the download path, where only 200 is accepted
    pub async fn fetch_playlist(&self, url: &str) -> Result<(Url, String)> {
        self.get_text(url, |status| status == StatusCode::OK).await
    }

    async fn get_text(&self, url: &str, accept: fn(StatusCode) -> bool) -> Result<(Url, String)> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !accept(status) {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().clone();
        let text = response.text().await?;
        Ok((final_url, text))
    }

    /// Start a streamed GET. Anything other than 200 is an error.
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<Bytes>>)> {
        let response = self.client.get(download_url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(ApiError::Status {
                status: response.status().as_u16(),
                url: download_url.to_string(),
            });
        }

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }

    /// Download a whole body into memory
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        let (total_size, stream) = self.download_file_stream(url).await?;
        let mut stream = Box::pin(stream);

        let mut buffer = BytesMut::with_capacity(
            total_size
                .map(|t| t as usize)
                .unwrap_or(self.config.chunk_size)
                .min(self.config.chunk_size * 64),
        );
        let mut next_report = self.config.chunk_size;

        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);

            if buffer.len() >= next_report {
                match total_size {
                    Some(total) if total > 0 => debug!(
                        "{}: {:.1}% ({} of {} bytes)",
                        url,
                        buffer.len() as f64 * 100.0 / total as f64,
                        buffer.len(),
                        total
                    ),
                    _ => debug!("{}: {} bytes", url, buffer.len()),
                }
                next_report = buffer.len() + self.config.chunk_size;
            }
        }

        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(ClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_probe_reads_content_type() {
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/clip.mp4")
            .with_status(200)
            .with_header("content-type", "Video/MP4")
            .create_async()
            .await;

        let probe = client()
            .probe(&format!("{}/clip.mp4", server.url()))
            .await
            .unwrap();

        head.assert_async().await;
        assert_eq!(probe.status, 200);
        assert_eq!(probe.content_type, "video/mp4");
        assert!(!probe.is_html());
        assert!(!probe.is_playlist());
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_get_on_405() {
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/page")
            .with_status(405)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html></html>")
            .create_async()
            .await;

        let probe = client()
            .probe(&format!("{}/page", server.url()))
            .await
            .unwrap();

        head.assert_async().await;
        get.assert_async().await;
        assert!(probe.is_html());
    }

    #[tokio::test]
    async fn test_probe_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/missing.mp4")
            .with_status(404)
            .create_async()
            .await;

        let err = client()
            .probe(&format!("{}/missing.mp4", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_playlist_fetch_requires_200() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/index.m3u8")
            .with_status(206)
            .with_body("#EXTM3U\n")
            .create_async()
            .await;
        let url = format!("{}/index.m3u8", server.url());

        let (_, text) = client().fetch_text(&url).await.unwrap();
        assert_eq!(text, "#EXTM3U\n");

        let err = client().fetch_playlist(&url).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 206, .. }));
    }

    #[tokio::test]
    async fn test_fetch_bytes_accumulates_body() {
        let mut server = mockito::Server::new_async().await;
        let body = vec![7u8; 3 * 1024 * 1024 + 17];
        server
            .mock("GET", "/big.bin")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let bytes = client()
            .fetch_bytes(&format!("{}/big.bin", server.url()))
            .await
            .unwrap();

        assert_eq!(bytes.len(), body.len());
        assert_eq!(&bytes[..], &body[..]);
    }

    #[tokio::test]
    async fn test_fetch_bytes_requires_200() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/partial.bin")
            .with_status(206)
            .with_body("abc")
            .create_async()
            .await;

        let err = client()
            .fetch_bytes(&format!("{}/partial.bin", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 206, .. }));
    }
}
