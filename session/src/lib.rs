// Forbid accidental stdout/stderr writes in the library.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod attachments;
mod config;
mod events;
mod mode;
mod navigator;
mod session;
mod suggestions;
mod validator;

pub use attachments::Attachment;
pub use attachments::AttachmentStore;
pub use attachments::StatusOutcome;
pub use config::SessionConfig;
pub use events::SessionRequest;
pub use events::SessionRequestSender;
pub use mode::SessionMode;
pub use mode::SessionModeController;
pub use navigator::SelectionNavigator;
pub use session::ComposeboxSession;
pub use session::KeyOutcome;
pub use suggestions::SuggestionCoordinator;
pub use validator::RejectionKind;
pub use validator::ValidationOutcome;
pub use validator::validate;
