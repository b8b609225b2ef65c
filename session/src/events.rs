//! Outgoing requests from the session controller to its host and backends.
//!
//! The controller itself is synchronous; everything that crosses a process or
//! async boundary is expressed as a [`SessionRequest`] pushed onto an
//! unbounded channel. Using one event enum avoids bubbling channels through
//! the individual components, and gives tests a single place to assert the
//! exact request sequence.

use composebox_protocol::ContextToken;
use composebox_protocol::autocomplete::DestinationRef;
use composebox_protocol::context::FileMeta;
use composebox_protocol::context::TabInfo;
use tokio::sync::mpsc::UnboundedSender;

use crate::validator::RejectionKind;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionRequest {
    // Upload/context backend.
    AddFileContext {
        token: ContextToken,
        meta: FileMeta,
        bytes: Vec<u8>,
    },
    AddTabContext {
        token: ContextToken,
        tab: TabInfo,
    },
    DeleteContext(ContextToken),
    ClearFileContexts,
    NotifySessionStarted,

    // Suggestion backend.
    QueryAutocomplete {
        input: String,
    },
    StopAutocomplete,
    OpenAutocompleteMatch {
        index: usize,
        destination: DestinationRef,
    },
    DeleteAutocompleteMatch {
        index: usize,
        destination: DestinationRef,
    },
    /// Fallback submission when no navigable/default match exists.
    SubmitQuery {
        input: String,
    },
    GetRecentTabs,

    // Host notifications.
    SetCreateImageMode {
        active: bool,
        image_present: bool,
    },
    /// Transient dismissible notice; the kind doubles as the telemetry code.
    ValidationNotice(RejectionKind),
    CloseSession {
        input: String,
    },
}

/// Clonable sender handle shared by all session components.
#[derive(Clone, Debug)]
pub struct SessionRequestSender(UnboundedSender<SessionRequest>);

impl SessionRequestSender {
    pub fn new(tx: UnboundedSender<SessionRequest>) -> Self {
        Self(tx)
    }

    /// Send a request to the host. The channel closing means the host is
    /// tearing the session down, so a failed send is logged and dropped.
    pub fn send(&self, request: SessionRequest) {
        if let Err(err) = self.0.send(request) {
            tracing::error!("failed to send session request: {err}");
        }
    }
}
