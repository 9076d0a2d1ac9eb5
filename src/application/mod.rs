pub mod download_coordinator;
pub mod fetcher;
pub mod inspector;
pub mod link_extractor;

pub use download_coordinator::DownloadCoordinator;

use crate::api::ApiError;
use crate::domain::AppError;

/// Map a client error raised while inspecting a link
pub(crate) fn fetch_error(e: ApiError) -> AppError {
    match e {
        ApiError::RequestError(e) => AppError::Request(e.to_string()),
        other => AppError::FetchError(other.to_string()),
    }
}

/// Map a client error raised while retrieving content
pub(crate) fn download_error(e: ApiError) -> AppError {
    match e {
        ApiError::RequestError(e) => AppError::Request(e.to_string()),
        other => AppError::DownloadFailed(other.to_string()),
    }
}
