//! Ordered collection of attachment records and their upload lifecycle.
//!
//! Records are inserted synchronously (optimistic UI) before the upload
//! backend has acknowledged anything; backend callbacks then move the record
//! through [`UploadStatus`]. Terminal failures silently drop the record, so
//! everything held here is live by construction, but callers still go through
//! [`AttachmentStore::live_attachments`] which re-asserts the ordering
//! invariant.

use composebox_protocol::ContextToken;
use composebox_protocol::context::AttachmentKind;
use composebox_protocol::context::CandidateFile;
use composebox_protocol::context::PreviewRef;
use composebox_protocol::context::SelectedFileInfo;
use composebox_protocol::context::TabInfo;
use composebox_protocol::context::UploadErrorKind;
use composebox_protocol::context::UploadStatus;
use url::Url;

use crate::events::SessionRequest;
use crate::events::SessionRequestSender;

/// One user-supplied piece of context.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Synthesized at attach time; replaced by the backend-assigned token once
    /// the upload round-trip is accepted.
    pub token: ContextToken,
    pub kind: AttachmentKind,
    pub display_name: String,
    pub mime_type: Option<String>,
    pub source_url: Option<Url>,
    /// Set for `Tab` attachments so the recent-tab chip can hide tabs that
    /// are already attached.
    pub tab_id: Option<i64>,
    pub preview: Option<PreviewRef>,
    pub status: UploadStatus,
    pub is_deletable: bool,
    /// Assigned synchronously at validation time and never reassigned;
    /// display order is a sort by this, independent of upload completion
    /// order.
    pub insertion_index: u64,
}

/// What a backend status push did to the store, so the session can decide
/// whether a suggestion stop/requery cycle is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Attachment reached `SuggestSignalsReady`; contextual suggestions can
    /// now use it. Carries the kind so image-gating can be applied upstream.
    BecameReady(AttachmentKind),
    /// Status recorded with no suggestion-relevant change.
    Updated,
    /// Terminal failure dropped the attachment from the live set. `was_ready`
    /// records whether its suggest signals had already been consumed, i.e.
    /// whether a query computed with them may be in flight.
    Removed {
        kind: AttachmentKind,
        was_ready: bool,
    },
    /// Unknown token, e.g. a late callback for an already-deleted attachment.
    Ignored,
}

pub struct AttachmentStore {
    records: Vec<Attachment>,
    next_insertion_index: u64,
    next_object_ref: u64,
    tx: SessionRequestSender,
}

impl AttachmentStore {
    pub fn new(tx: SessionRequestSender) -> Self {
        Self {
            records: Vec::new(),
            next_insertion_index: 0,
            next_object_ref: 0,
            tx,
        }
    }

    /// Insert a placeholder record for a validated file and kick off the
    /// upload round-trip. The returned token identifies the record until the
    /// backend swaps in its own.
    pub fn attach(&mut self, file: CandidateFile) -> ContextToken {
        let token = ContextToken::new();
        let kind = if file.is_image() {
            AttachmentKind::Image
        } else {
            AttachmentKind::File
        };
        // Only images get a preview handle; PDFs render as a generic icon.
        let preview = (kind == AttachmentKind::Image).then(|| {
            let object_ref = self.next_object_ref;
            self.next_object_ref += 1;
            PreviewRef::Object(object_ref)
        });
        let insertion_index = self.bump_insertion_index();

        self.records.push(Attachment {
            token,
            kind,
            display_name: file.file_name.clone(),
            mime_type: Some(file.mime_type.clone()),
            source_url: None,
            tab_id: None,
            preview,
            status: UploadStatus::Queued,
            is_deletable: true,
            insertion_index,
        });

        tracing::debug!("attaching {} as {kind} ({token})", file.file_name);
        self.tx.send(SessionRequest::AddFileContext {
            token,
            meta: file.meta(),
            bytes: file.bytes,
        });
        token
    }

    /// Same contract as [`AttachmentStore::attach`] for a browser tab; no
    /// byte payload.
    pub fn attach_tab(&mut self, tab: TabInfo) -> ContextToken {
        let token = ContextToken::new();
        let insertion_index = self.bump_insertion_index();
        self.records.push(Attachment {
            token,
            kind: AttachmentKind::Tab,
            display_name: tab.title.clone(),
            mime_type: None,
            source_url: Some(tab.url.clone()),
            tab_id: Some(tab.tab_id),
            preview: None,
            status: UploadStatus::Queued,
            is_deletable: true,
            insertion_index,
        });

        self.tx.send(SessionRequest::AddTabContext { token, tab });
        token
    }

    /// Host-initiated attachment (e.g. a visual selection), delivered without
    /// a corresponding client request. The host already owns the bytes, so
    /// the record arrives committed.
    pub fn attach_host_file(&mut self, token: ContextToken, info: SelectedFileInfo) {
        let insertion_index = self.bump_insertion_index();
        self.records.push(Attachment {
            token,
            kind: AttachmentKind::Image,
            display_name: info.file_name,
            mime_type: Some(info.mime_type),
            source_url: None,
            tab_id: None,
            preview: Some(PreviewRef::DataUri(info.image_data_url)),
            status: UploadStatus::Uploaded,
            is_deletable: info.is_deletable,
            insertion_index,
        });
    }

    /// The upload backend accepted the round-trip and assigned its own token.
    pub fn on_upload_accepted(&mut self, client_token: ContextToken, backend_token: ContextToken) {
        let Some(record) = self.record_mut(client_token) else {
            // Attachment was deleted before the backend responded.
            tracing::debug!("upload accepted for unknown token {client_token}");
            return;
        };
        record.token = backend_token;
        if record.status == UploadStatus::Queued {
            record.status = UploadStatus::Uploading;
        }
    }

    /// Apply a backend status push. Unknown tokens are ignored so a late
    /// callback for a deleted attachment is harmless.
    pub fn on_status_changed(
        &mut self,
        token: ContextToken,
        status: UploadStatus,
        error_kind: Option<UploadErrorKind>,
    ) -> StatusOutcome {
        let Some(record) = self.record_mut(token) else {
            return StatusOutcome::Ignored;
        };
        let kind = record.kind;

        if status.is_terminal_failure() {
            let was_ready = matches!(
                record.status,
                UploadStatus::SuggestSignalsReady | UploadStatus::Uploaded
            );
            tracing::debug!(
                "dropping {} after {status}{}",
                record.display_name,
                error_kind.map(|err| format!(" ({err})")).unwrap_or_default()
            );
            self.records.retain(|record| record.token != token);
            return StatusOutcome::Removed { kind, was_ready };
        }

        let became_ready =
            status == UploadStatus::SuggestSignalsReady && record.status != status;
        record.status = status;
        if became_ready {
            StatusOutcome::BecameReady(kind)
        } else {
            StatusOutcome::Updated
        }
    }

    /// Remove an attachment and release the backend resource. Refuses
    /// non-deletable records.
    pub fn remove(&mut self, token: ContextToken) -> bool {
        let Some(record) = self.records.iter().find(|record| record.token == token) else {
            return false;
        };
        if !record.is_deletable {
            tracing::warn!("refusing to remove non-deletable attachment {token}");
            return false;
        }
        self.records.retain(|record| record.token != token);
        self.tx.send(SessionRequest::DeleteContext(token));
        true
    }

    /// Drop every record and release all backend resources in one call.
    pub fn clear(&mut self) {
        if self.records.is_empty() {
            return;
        }
        self.records.clear();
        self.tx.send(SessionRequest::ClearFileContexts);
    }

    /// Live attachments sorted by insertion index.
    pub fn live_attachments(&self) -> Vec<&Attachment> {
        let mut live: Vec<&Attachment> = self
            .records
            .iter()
            .filter(|record| !record.status.is_terminal_failure())
            .collect();
        live.sort_by_key(|record| record.insertion_index);
        live
    }

    pub fn live_count(&self) -> usize {
        self.live_attachments().len()
    }

    pub fn has_image(&self) -> bool {
        self.live_attachments()
            .iter()
            .any(|record| record.kind == AttachmentKind::Image)
    }

    pub fn contains_tab(&self, tab_id: i64) -> bool {
        self.live_attachments()
            .iter()
            .any(|record| record.tab_id == Some(tab_id))
    }

    pub fn get(&self, token: ContextToken) -> Option<&Attachment> {
        self.records.iter().find(|record| record.token == token)
    }

    fn record_mut(&mut self, token: ContextToken) -> Option<&mut Attachment> {
        self.records
            .iter_mut()
            .find(|record| record.token == token)
    }

    fn bump_insertion_index(&mut self) -> u64 {
        let index = self.next_insertion_index;
        self.next_insertion_index += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    fn store() -> (AttachmentStore, UnboundedReceiver<SessionRequest>) {
        let (tx, rx) = unbounded_channel();
        (AttachmentStore::new(SessionRequestSender::new(tx)), rx)
    }

    fn png(name: &str) -> CandidateFile {
        CandidateFile {
            file_name: name.to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0u8; 4],
        }
    }

    fn pdf(name: &str) -> CandidateFile {
        CandidateFile {
            file_name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: vec![0u8; 4],
        }
    }

    fn drain(rx: &mut UnboundedReceiver<SessionRequest>) -> Vec<SessionRequest> {
        let mut out = Vec::new();
        while let Ok(request) = rx.try_recv() {
            out.push(request);
        }
        out
    }

    #[test]
    fn attach_inserts_placeholder_and_sends_upload_request() {
        let (mut store, mut rx) = store();
        let token = store.attach(png("shot.png"));

        let live = store.live_attachments();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].status, UploadStatus::Queued);
        assert_eq!(live[0].kind, AttachmentKind::Image);
        assert!(matches!(live[0].preview, Some(PreviewRef::Object(_))));

        let requests = drain(&mut rx);
        assert_eq!(requests.len(), 1);
        assert!(matches!(
            &requests[0],
            SessionRequest::AddFileContext { token: t, meta, .. }
                if *t == token && meta.file_name == "shot.png"
        ));
    }

    #[test]
    fn pdf_attachment_has_no_preview() {
        let (mut store, _rx) = store();
        store.attach(pdf("doc.pdf"));
        let live = store.live_attachments();
        assert_eq!(live[0].kind, AttachmentKind::File);
        assert_eq!(live[0].preview, None);
    }

    #[test]
    fn display_order_follows_insertion_not_upload_completion() {
        let (mut store, _rx) = store();
        let first = store.attach(png("first.png"));
        let second = store.attach(png("second.png"));

        // Second upload resolves before the first; order must not change.
        store.on_upload_accepted(second, ContextToken::new());
        store.on_upload_accepted(first, ContextToken::new());

        let names: Vec<&str> = store
            .live_attachments()
            .iter()
            .map(|a| a.display_name.as_str())
            .collect();
        assert_eq!(names, ["first.png", "second.png"]);
    }

    #[test]
    fn backend_acceptance_swaps_token_and_moves_to_uploading() {
        let (mut store, _rx) = store();
        let client = store.attach(png("shot.png"));
        let backend = ContextToken::new();
        store.on_upload_accepted(client, backend);

        let live = store.live_attachments();
        assert_eq!(live[0].token, backend);
        assert_eq!(live[0].status, UploadStatus::Uploading);
    }

    #[test]
    fn terminal_failure_drops_the_attachment() {
        let (mut store, _rx) = store();
        for status in [
            UploadStatus::ValidationFailed,
            UploadStatus::UploadFailed,
            UploadStatus::UploadExpired,
        ] {
            let token = store.attach(png("shot.png"));
            let outcome = store.on_status_changed(token, status, None);
            assert_eq!(
                outcome,
                StatusOutcome::Removed {
                    kind: AttachmentKind::Image,
                    was_ready: false
                }
            );
            assert_eq!(store.live_count(), 0);
        }
    }

    #[test]
    fn expiry_after_readiness_flags_consumed_signals() {
        let (mut store, _rx) = store();
        let token = store.attach(pdf("doc.pdf"));
        store.on_status_changed(token, UploadStatus::SuggestSignalsReady, None);

        assert_eq!(
            store.on_status_changed(token, UploadStatus::UploadExpired, None),
            StatusOutcome::Removed {
                kind: AttachmentKind::File,
                was_ready: true
            }
        );
    }

    #[test]
    fn suggest_signals_ready_reports_became_ready_once() {
        let (mut store, _rx) = store();
        let token = store.attach(pdf("doc.pdf"));
        assert_eq!(
            store.on_status_changed(token, UploadStatus::SuggestSignalsReady, None),
            StatusOutcome::BecameReady(AttachmentKind::File)
        );
        // Re-delivering the same status is not a new readiness edge.
        assert_eq!(
            store.on_status_changed(token, UploadStatus::SuggestSignalsReady, None),
            StatusOutcome::Updated
        );
        // Bytes finishing later is status bookkeeping only.
        assert_eq!(
            store.on_status_changed(token, UploadStatus::Uploaded, None),
            StatusOutcome::Updated
        );
    }

    #[test]
    fn late_status_for_deleted_token_is_ignored() {
        let (mut store, mut rx) = store();
        let token = store.attach(png("shot.png"));
        assert!(store.remove(token));
        assert_eq!(store.live_count(), 0);

        let outcome = store.on_status_changed(token, UploadStatus::Uploaded, None);
        assert_eq!(outcome, StatusOutcome::Ignored);

        let requests = drain(&mut rx);
        assert!(requests.contains(&SessionRequest::DeleteContext(token)));
    }

    #[test]
    fn remove_refuses_non_deletable_host_context() {
        let (mut store, mut rx) = store();
        let token = ContextToken::new();
        store.attach_host_file(
            token,
            SelectedFileInfo {
                file_name: "Visual Selection".to_string(),
                mime_type: "image/png".to_string(),
                image_data_url: "data:image/png;base64,sometestdata".to_string(),
                is_deletable: false,
            },
        );
        drain(&mut rx);

        assert!(!store.remove(token));
        assert_eq!(store.live_count(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn host_file_arrives_committed_with_data_uri_preview() {
        let (mut store, _rx) = store();
        let token = ContextToken::new();
        store.attach_host_file(
            token,
            SelectedFileInfo {
                file_name: "Visual Selection".to_string(),
                mime_type: "image/png".to_string(),
                image_data_url: "data:image/png;base64,sometestdata".to_string(),
                is_deletable: true,
            },
        );

        let live = store.live_attachments();
        assert_eq!(live[0].status, UploadStatus::Uploaded);
        assert_eq!(
            live[0].preview,
            Some(PreviewRef::DataUri(
                "data:image/png;base64,sometestdata".to_string()
            ))
        );
        assert!(store.has_image());
    }

    #[test]
    fn clear_drops_everything_with_one_backend_call() {
        let (mut store, mut rx) = store();
        store.attach(png("a.png"));
        store.attach(pdf("b.pdf"));
        drain(&mut rx);

        store.clear();
        assert_eq!(store.live_count(), 0);
        assert_eq!(drain(&mut rx), [SessionRequest::ClearFileContexts]);

        // Clearing an already-empty store is a no-op upstream too.
        store.clear();
        assert!(drain(&mut rx).is_empty());
    }
}
