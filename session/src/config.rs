//! Host-provided configuration for one composebox session.
//!
//! The host resolves these values however it likes (feature flags, prefs,
//! experiment config) and hands the struct to [`crate::ComposeboxSession`] at
//! creation time. Every field has a serde default so partial configs
//! deserialize cleanly.

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of live attachments.
    pub file_max_count: usize,
    /// Maximum attachment size in bytes.
    pub file_max_size: u64,
    /// Allow-listed image MIME types.
    pub image_file_types: Vec<String>,
    /// Allow-listed non-image attachment types. Entries starting with `.` are
    /// matched against the file name suffix instead of the MIME type.
    pub attachment_file_types: Vec<String>,

    /// Show suggestions while the input is empty.
    pub show_zero_prefix_suggestions: bool,
    /// Show suggestions while the input is non-empty.
    pub show_typed_suggestions: bool,
    /// Re-query suggestions when an image attachment becomes ready.
    pub show_image_suggestions: bool,
    /// Expose the create-image mode.
    pub show_create_image_mode: bool,
    /// Surface the one-tap recent-tab chip alongside the dropdown.
    pub show_recent_tab_chip: bool,
    /// Context menu entry point instead of direct upload buttons.
    pub show_context_menu: bool,
    /// PDF upload affordance.
    pub show_pdf_upload: bool,
    /// Whether Escape closes the session outright instead of clearing text.
    pub close_by_escape: bool,

    pub placeholder_default: String,
    pub placeholder_create_image: String,
    pub placeholder_deep_search: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file_max_count: 5,
            file_max_size: 40 * 1024 * 1024,
            image_file_types: [
                "image/avif",
                "image/bmp",
                "image/jpeg",
                "image/png",
                "image/webp",
                "image/heif",
                "image/heic",
            ]
            .map(str::to_string)
            .to_vec(),
            attachment_file_types: [".pdf", "application/pdf"].map(str::to_string).to_vec(),
            show_zero_prefix_suggestions: false,
            show_typed_suggestions: false,
            show_image_suggestions: false,
            show_create_image_mode: false,
            show_recent_tab_chip: false,
            show_context_menu: false,
            show_pdf_upload: true,
            close_by_escape: false,
            placeholder_default: "Ask anything".to_string(),
            placeholder_create_image: "Describe the image you want to create".to_string(),
            placeholder_deep_search: "Ask a question to research in depth".to_string(),
        }
    }
}

impl SessionConfig {
    /// Whether `mime_type`/`file_name` is acceptable at all, i.e. in the union
    /// of the image and attachment allow-lists.
    pub fn is_allowed_type(&self, mime_type: &str, file_name: &str) -> bool {
        self.is_allowed_image_type(mime_type)
            || self
                .attachment_file_types
                .iter()
                .any(|entry| matches_type_entry(entry, mime_type, file_name))
    }

    pub fn is_allowed_image_type(&self, mime_type: &str) -> bool {
        self.image_file_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}

fn matches_type_entry(entry: &str, mime_type: &str, file_name: &str) -> bool {
    if let Some(suffix) = entry.strip_prefix('.') {
        let lower = file_name.to_ascii_lowercase();
        lower
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(suffix))
    } else {
        entry.eq_ignore_ascii_case(mime_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allow_lists_cover_png_and_pdf_but_not_svg() {
        let config = SessionConfig::default();
        assert!(config.is_allowed_type("image/png", "shot.png"));
        assert!(config.is_allowed_type("application/pdf", "doc.pdf"));
        // Extension entry catches a PDF with a generic MIME type.
        assert!(config.is_allowed_type("application/octet-stream", "doc.pdf"));
        assert!(!config.is_allowed_type("image/svg+xml", "icon.svg"));
        assert!(!config.is_allowed_type("text/plain", "notes.txt"));
    }

    #[test]
    fn partial_config_deserializes_with_defaults() -> anyhow::Result<()> {
        let config: SessionConfig =
            serde_json::from_str(r#"{"file_max_count": 1, "show_zero_prefix_suggestions": true}"#)?;
        assert_eq!(config.file_max_count, 1);
        assert!(config.show_zero_prefix_suggestions);
        assert!(!config.show_typed_suggestions);
        assert_eq!(config.file_max_size, SessionConfig::default().file_max_size);
        Ok(())
    }
}
