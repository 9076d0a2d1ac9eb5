use std::path::PathBuf;

use iced::Task;

use crate::application::DownloadCoordinator;
use crate::domain::{AppError, DownloadOption, DownloadRequest, DownloadedFile, InspectRequest};
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    // URL the current option list was discovered from
    inspected_url: Option<String>,
    pending_file: Option<DownloadedFile>,
}

impl DownloadApp {
    pub fn new(coordinator: DownloadCoordinator) -> Self {
        let view = DownloadView {
            extractor_available: coordinator.has_extractor(),
            ..DownloadView::default()
        };

        Self {
            view,
            coordinator,
            inspected_url: None,
            pending_file: None,
        }
    }

    fn fail(&mut self, context: &str, error: AppError) {
        let message = match error {
            // Display already reads "Download failed: ..."
            AppError::DownloadFailed(_) => error.to_string(),
            _ => format!("{}: {}", context, error),
        };
        warn!("{}", message);
        self.view.is_busy = false;
        self.view.report(message);
    }

    /// Drop a downloaded file that has not been saved yet
    fn discard_pending_file(&mut self) {
        self.pending_file = None;
        self.view.has_pending_file = false;
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// (Inspected URL, discovered options)
    InspectCompleted(String, Result<Vec<DownloadOption>, AppError>),
    DownloadCompleted(Result<DownloadedFile, AppError>),
    FileSaveSelected(Option<PathBuf>),
    SaveCompleted(Result<PathBuf, AppError>),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            if app.view.is_busy {
                return Task::none();
            }

            match ui_msg {
                DownloadMessage::InspectPressed => {
                    let request = InspectRequest {
                        url: app.view.url.trim().to_string(),
                        use_extractor: app.view.use_extractor,
                    };
                    let coordinator = app.coordinator.clone();

                    app.view.is_busy = true;
                    app.view.report(format!("Inspecting {}", request.url));

                    let url = request.url.clone();
                    return Task::perform(
                        async move { coordinator.inspect(request).await },
                        move |result| Message::InspectCompleted(url, result),
                    );
                }
                DownloadMessage::DownloadPressed => {
                    let Some(option) = app.view.selected.clone() else {
                        app.view.report("Inspect the link and choose a format first");
                        return Task::none();
                    };
                    let source_url = app
                        .inspected_url
                        .clone()
                        .unwrap_or_else(|| app.view.url.trim().to_string());
                    let coordinator = app.coordinator.clone();

                    app.discard_pending_file();
                    app.view.is_busy = true;
                    app.view.report(format!("Downloading {}", option.label));

                    return Task::perform(
                        async move {
                            coordinator
                                .download(DownloadRequest { source_url, option })
                                .await
                        },
                        Message::DownloadCompleted,
                    );
                }
                DownloadMessage::SavePressed => {
                    if let Some(file) = &app.pending_file {
                        let coordinator = app.coordinator.clone();
                        let suggested = file.file_name.clone();

                        app.view.is_busy = true;
                        app.view.status_message = "Please select save location...".to_string();

                        return Task::perform(
                            async move { coordinator.choose_save_path(suggested).await },
                            Message::FileSaveSelected,
                        );
                    }
                }
                DownloadMessage::UrlChanged(_)
                | DownloadMessage::ExtractorToggled
                | DownloadMessage::OptionSelected(_) => {}
            }
        }
        Message::InspectCompleted(url, result) => {
            app.view.options.clear();
            app.view.selected = None;
            app.inspected_url = None;
            app.discard_pending_file();

            match result {
                Ok(options) => {
                    info!("{} options for {}", options.len(), url);
                    app.view.is_busy = false;
                    app.view.report(format!(
                        "Found {} option(s). Choose a format and press Download",
                        options.len()
                    ));
                    app.view.selected = options.first().cloned();
                    app.view.options = options;
                    app.inspected_url = Some(url);
                }
                Err(e) => app.fail("Inspection failed", e),
            }
        }
        Message::DownloadCompleted(result) => match result {
            Ok(file) => {
                app.view.is_busy = false;
                app.view.report(format!(
                    "Downloaded {} ({}, about {:.2} MB). Press Save file to keep it",
                    file.file_name,
                    file.mime,
                    file.size_mb()
                ));
                app.view.has_pending_file = true;
                app.pending_file = Some(file);
            }
            Err(e) => app.fail("Download failed", e),
        },
        Message::FileSaveSelected(path_opt) => match (path_opt, app.pending_file.clone()) {
            (Some(path), Some(file)) => {
                let coordinator = app.coordinator.clone();
                app.view.status_message = format!("Saving to: {}", path.display());

                return Task::perform(
                    async move { coordinator.save(file, path).await },
                    Message::SaveCompleted,
                );
            }
            _ => {
                // User cancelled dialog
                app.view.is_busy = false;
                app.view.report("Save cancelled");
            }
        },
        Message::SaveCompleted(result) => match result {
            Ok(path) => {
                app.view.is_busy = false;
                app.view.report(format!("Saved: {}", path.display()));
            }
            Err(e) => app.fail("Save failed", e),
        },
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, ClientConfig};

    fn app() -> DownloadApp {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        DownloadApp::new(DownloadCoordinator::new(client, None))
    }

    #[test]
    fn test_inspection_replaces_session_options() {
        let mut app = app();
        app.view.is_busy = true;

        let options = vec![
            DownloadOption::hls("HLS 640x360", "https://cdn.example.com/360.m3u8"),
            DownloadOption::hls("HLS 1280x720", "https://cdn.example.com/720.m3u8"),
        ];
        let _ = update(
            &mut app,
            Message::InspectCompleted(
                "https://cdn.example.com/master.m3u8".to_string(),
                Ok(options.clone()),
            ),
        );

        assert!(!app.view.is_busy);
        assert_eq!(app.view.options, options);
        assert_eq!(app.view.selected.as_ref(), options.first());
        assert_eq!(
            app.inspected_url.as_deref(),
            Some("https://cdn.example.com/master.m3u8")
        );

        let _ = update(
            &mut app,
            Message::InspectCompleted(
                "https://example.com/page".to_string(),
                Err(AppError::NoLinksFound),
            ),
        );
        assert!(app.view.options.is_empty());
        assert!(app.view.selected.is_none());
        assert!(app.view.status_message.contains("No video links"));
        assert_eq!(app.view.log.len(), 2);
    }

    #[test]
    fn test_download_without_selection_is_refused() {
        let mut app = app();
        let _ = update(&mut app, Message::UiMessage(DownloadMessage::DownloadPressed));

        assert!(!app.view.is_busy);
        assert!(app.view.status_message.contains("choose a format"));
    }

    #[test]
    fn test_completed_download_is_kept_for_saving() {
        let mut app = app();
        app.view.is_busy = true;

        let file = DownloadedFile {
            file_name: "clip.mp4".to_string(),
            mime: "video/mp4".to_string(),
            data: bytes::Bytes::from(vec![0u8; 3 * 1024 * 1024]),
        };
        let _ = update(&mut app, Message::DownloadCompleted(Ok(file)));

        assert!(!app.view.is_busy);
        assert!(app.view.has_pending_file);
        assert!(app.view.status_message.contains("3.00 MB"));
        assert_eq!(
            app.pending_file.as_ref().map(|f| f.file_name.as_str()),
            Some("clip.mp4")
        );
    }

    #[test]
    fn test_failed_download_does_not_keep_previous_file() {
        let mut app = app();
        let first = DownloadedFile {
            file_name: "first.mp4".to_string(),
            mime: "video/mp4".to_string(),
            data: bytes::Bytes::from_static(b"first"),
        };
        let _ = update(&mut app, Message::DownloadCompleted(Ok(first)));
        assert!(app.view.has_pending_file);

        let options = vec![DownloadOption::direct(
            "Original (mov)",
            "https://example.com/b.mov",
            "mov",
        )];
        let _ = update(
            &mut app,
            Message::InspectCompleted("https://example.com/b.mov".to_string(), Ok(options)),
        );
        assert!(!app.view.has_pending_file);
        assert!(app.pending_file.is_none());

        let _ = update(
            &mut app,
            Message::DownloadCompleted(Err(AppError::DownloadFailed("500".to_string()))),
        );
        assert!(!app.view.has_pending_file);
        assert!(app.pending_file.is_none());
        assert_eq!(app.view.status_message, "Download failed: 500");
    }

    #[test]
    fn test_new_download_discards_unsaved_file() {
        let mut app = app();
        let first = DownloadedFile {
            file_name: "first.mp4".to_string(),
            mime: "video/mp4".to_string(),
            data: bytes::Bytes::from_static(b"first"),
        };
        let _ = update(&mut app, Message::DownloadCompleted(Ok(first)));
        app.view.selected = Some(DownloadOption::direct(
            "Original (mp4)",
            "https://example.com/second.mp4",
            "mp4",
        ));

        let _ = update(&mut app, Message::UiMessage(DownloadMessage::DownloadPressed));

        assert!(app.view.is_busy);
        assert!(!app.view.has_pending_file);
        assert!(app.pending_file.is_none());
    }

    #[test]
    fn test_cancelled_save_dialog() {
        let mut app = app();
        app.view.is_busy = true;
        let _ = update(&mut app, Message::FileSaveSelected(None));

        assert!(!app.view.is_busy);
        assert_eq!(app.view.status_message, "Save cancelled");
    }
}
