//! Attached-context data model: files, images, and browser tabs the user has
//! added to the current input session, plus the upload lifecycle the backend
//! reports for each of them.

use serde::Deserialize;
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttachmentKind {
    File,
    Image,
    Tab,
}

/// Upload lifecycle pushed by the backend for one attached context.
///
/// The client-observable path is `Queued -> Uploading -> SuggestSignalsReady
/// -> Uploaded`. `SuggestSignalsReady` means the backend has extracted enough
/// signal for contextual suggestions even though the byte upload may still be
/// finishing. Any state can jump to one of the three terminal failure
/// statuses, which drop the attachment from the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UploadStatus {
    Queued,
    Uploading,
    SuggestSignalsReady,
    Uploaded,
    ValidationFailed,
    UploadFailed,
    UploadExpired,
}

impl UploadStatus {
    /// Terminal statuses that remove the attachment from the live set.
    pub fn is_terminal_failure(self) -> bool {
        matches!(
            self,
            UploadStatus::ValidationFailed | UploadStatus::UploadFailed | UploadStatus::UploadExpired
        )
    }
}

/// Sub-kind carried alongside a late `ValidationFailed` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UploadErrorKind {
    ImageProcessingError,
    Unknown,
}

/// Metadata sent with the byte payload in `AddFileContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub file_name: String,
    pub mime_type: String,
}

/// One candidate file as handed over by a file picker or paste event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn meta(&self) -> FileMeta {
        FileMeta {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Preview handle for an attachment thumbnail.
///
/// Exactly one representation is ever used per attachment: locally attached
/// images get an in-memory object handle the host can resolve to pixels, while
/// host-pushed context (e.g. a visual selection) arrives pre-rendered as a
/// data URI. PDFs and tabs carry no preview at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewRef {
    /// Opaque handle to an in-memory object owned by the host.
    Object(u64),
    /// Pre-rendered `data:` URI.
    DataUri(String),
}

/// A browser tab offered as attachable context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub tab_id: i64,
    pub title: String,
    pub url: Url,
    /// Whether the tab qualifies for the one-tap "recent tab" chip.
    #[serde(default)]
    pub show_in_recent_tab_chip: bool,
}

/// Host-initiated attachment (e.g. a visual selection) pushed without a
/// corresponding client request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFileInfo {
    pub file_name: String,
    pub mime_type: String,
    /// Pre-rendered thumbnail; host-pushed context never ships raw bytes.
    pub image_data_url: String,
    /// System-injected context may be non-deletable.
    pub is_deletable: bool,
}
