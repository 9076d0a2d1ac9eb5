#[macro_use]
extern crate log;

mod api;
mod app;
mod application;
mod domain;
mod extractor;
mod ui;
mod utils;

use std::sync::Arc;

use iced::window;

use crate::api::{ApiClient, ClientConfig};
use crate::application::DownloadCoordinator;
use crate::extractor::{MediaExtractor, YtDlpConfig, YtDlpExtractor};

/// Register yt-dlp only when its binary runs on this machine
fn detect_extractor() -> Option<Arc<dyn MediaExtractor>> {
    let extractor = YtDlpExtractor::new(YtDlpConfig::default());
    let available = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map(|rt| rt.block_on(extractor.is_available()))
        .unwrap_or(false);

    if available {
        info!("yt-dlp found, external extractor enabled");
        Some(Arc::new(extractor) as Arc<dyn MediaExtractor>)
    } else {
        info!("yt-dlp not found, external extractor disabled");
        None
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let icon_data = include_bytes!("../assets/icon.png");

    let icon = match image::load_from_memory(icon_data) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            window::icon::from_rgba(rgba.into_raw(), width, height).ok()
        }
        Err(e) => {
            warn!("Could not load window icon: {}", e);
            None
        }
    };

    let api_client = ApiClient::new(ClientConfig::default())?;
    let coordinator = DownloadCoordinator::new(api_client, detect_extractor());

    iced::application(
        move || app::DownloadApp::new(coordinator.clone()),
        app::update,
        app::view,
    )
    .title("Simple Video Downloader")
    .window(window::Settings {
        icon,
        ..Default::default()
    })
    .run()?;

    Ok(())
}
