pub mod error;
pub mod model;
pub mod playlist;

pub use error::AppError;
pub use model::{
    DownloadOption, DownloadRequest, DownloadedFile, InspectRequest, OptionKind,
};
pub use playlist::Playlist;
