//! Session mode tracking and the create-image host notification protocol.

use crate::config::SessionConfig;
use crate::events::SessionRequest;
use crate::events::SessionRequestSender;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionMode {
    #[default]
    Default,
    CreateImage,
    DeepSearch,
}

pub struct SessionModeController {
    mode: SessionMode,
    /// `image_present` value last sent with an active create-image
    /// notification; flips are notified exactly once.
    notified_image_present: bool,
    tx: SessionRequestSender,
}

impl SessionModeController {
    pub fn new(tx: SessionRequestSender) -> Self {
        Self {
            mode: SessionMode::Default,
            notified_image_present: false,
            tx,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Mode transitions are last-writer-wins; entering one mode implicitly
    /// leaves the other.
    pub fn enter_create_image(&mut self, image_present: bool) {
        self.mode = SessionMode::CreateImage;
        self.notified_image_present = image_present;
        self.tx.send(SessionRequest::SetCreateImageMode {
            active: true,
            image_present,
        });
    }

    pub fn exit_create_image(&mut self, image_present: bool) {
        if !self.mode.is_create_image() {
            return;
        }
        self.mode = SessionMode::Default;
        self.tx.send(SessionRequest::SetCreateImageMode {
            active: false,
            image_present,
        });
    }

    pub fn enter_deep_search(&mut self) {
        if self.mode.is_create_image() {
            self.exit_create_image(false);
        }
        self.mode = SessionMode::DeepSearch;
    }

    pub fn exit_deep_search(&mut self) {
        if self.mode.is_deep_search() {
            self.mode = SessionMode::Default;
        }
    }

    /// Re-notify the host when image presence flips while create-image mode
    /// is active. No-op in other modes.
    pub fn sync_image_present(&mut self, image_present: bool) {
        if !self.mode.is_create_image() || image_present == self.notified_image_present {
            return;
        }
        self.notified_image_present = image_present;
        self.tx.send(SessionRequest::SetCreateImageMode {
            active: true,
            image_present,
        });
    }

    pub fn placeholder_text<'a>(&self, config: &'a SessionConfig) -> &'a str {
        match self.mode {
            SessionMode::Default => &config.placeholder_default,
            SessionMode::CreateImage => &config.placeholder_create_image,
            SessionMode::DeepSearch => &config.placeholder_deep_search,
        }
    }
}
