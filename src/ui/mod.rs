use iced::{
    widget::{button, column, pick_list, row, scrollable, text, text_input, Column, Space},
    Element, Length,
};

use crate::domain::DownloadOption;

/// Main view state. Everything the session remembers between user
/// actions lives here.
pub struct DownloadView {
    pub url: String,
    pub use_extractor: bool,
    pub extractor_available: bool,
    pub status_message: String,
    pub is_busy: bool,
    pub options: Vec<DownloadOption>,
    pub selected: Option<DownloadOption>,
    pub has_pending_file: bool,
    pub log: Vec<String>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            use_extractor: false,
            extractor_available: false,
            status_message: "Enter a video URL and inspect it".to_string(),
            is_busy: false,
            options: Vec::new(),
            selected: None,
            has_pending_file: false,
            log: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    ExtractorToggled,
    InspectPressed,
    OptionSelected(DownloadOption),
    DownloadPressed,
    SavePressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url = url;
            }
            DownloadMessage::ExtractorToggled => {
                self.use_extractor = !self.use_extractor;
            }
            DownloadMessage::OptionSelected(option) => {
                self.selected = Some(option);
            }
            DownloadMessage::InspectPressed
            | DownloadMessage::DownloadPressed
            | DownloadMessage::SavePressed => {
                // Will be handled by the app
            }
        }
    }

    /// Set the status line and keep it in the session log
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.log.push(message.clone());
        self.status_message = message;
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let idle = !self.is_busy;

        let extractor_label = match (self.extractor_available, self.use_extractor) {
            (false, _) => "External extractor: not installed",
            (true, true) => "External extractor: on",
            (true, false) => "External extractor: off",
        };

        let placeholder = if self.options.is_empty() {
            "Inspect the link first"
        } else {
            "Choose format / resolution"
        };

        let log: Column<'_, DownloadMessage> = Column::with_children(
            self.log
                .iter()
                .rev()
                .map(|line| text(line).size(12).into()),
        )
        .spacing(4);

        column![
            text("Video Downloader").size(32),
            Space::new().height(Length::Fixed(10.0)),
            text("Video URL:").size(16),
            text_input("https://...", &self.url)
                .on_input(DownloadMessage::UrlChanged)
                .on_submit(DownloadMessage::InspectPressed)
                .padding(10),
            row![
                button("Inspect link")
                    .on_press_maybe(idle.then_some(DownloadMessage::InspectPressed))
                    .padding([10, 20]),
                button(text(extractor_label)).on_press_maybe(
                    (idle && self.extractor_available).then_some(DownloadMessage::ExtractorToggled)
                ),
            ]
            .spacing(10),
            pick_list(
                self.options.as_slice(),
                self.selected.as_ref(),
                DownloadMessage::OptionSelected
            )
            .placeholder(placeholder)
            .width(Length::Fill),
            row![
                button("Download")
                    .on_press_maybe(
                        (idle && self.selected.is_some()).then_some(DownloadMessage::DownloadPressed)
                    )
                    .padding([10, 20]),
                button("Save file")
                    .on_press_maybe(
                        (idle && self.has_pending_file).then_some(DownloadMessage::SavePressed)
                    )
                    .padding([10, 20]),
            ]
            .spacing(10),
            text(&self.status_message).size(14),
            scrollable(log).height(Length::Fill),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
