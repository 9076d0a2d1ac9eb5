use std::time::Duration;

use url::Url;

/// Result of the initial HEAD/GET probe of a URL
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// URL after redirects
    pub final_url: Url,
    pub status: u16,
    /// Lowercased `Content-Type` header, empty when absent
    pub content_type: String,
}

impl ProbeResponse {
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
    }

    pub fn is_playlist(&self) -> bool {
        self.content_type.contains("mpegurl")
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connect and read timeout applied to every request
    pub timeout: Duration,
    /// Granularity of download progress reporting
    pub chunk_size: usize,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            chunk_size: 1024 * 1024,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
