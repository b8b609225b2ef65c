//! The session controller tying input text, attachments, suggestions,
//! selection and mode together.
//!
//! [`ComposeboxSession`] is synchronous: the host feeds it key events, pasted
//! files and backend callbacks, and it pushes [`SessionRequest`]s in return.
//! Rendering state (dropdown visibility, placeholder text, disabled inputs,
//! the recent-tab chip) is derived on demand rather than cached.

use composebox_protocol::ContextToken;
use composebox_protocol::autocomplete::AutocompleteMatch;
use composebox_protocol::autocomplete::AutocompleteResult;
use composebox_protocol::context::AttachmentKind;
use composebox_protocol::context::CandidateFile;
use composebox_protocol::context::SelectedFileInfo;
use composebox_protocol::context::TabInfo;
use composebox_protocol::context::UploadErrorKind;
use composebox_protocol::context::UploadStatus;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;

use crate::attachments::AttachmentStore;
use crate::attachments::StatusOutcome;
use crate::config::SessionConfig;
use crate::events::SessionRequest;
use crate::events::SessionRequestSender;
use crate::mode::SessionMode;
use crate::mode::SessionModeController;
use crate::navigator::SelectionNavigator;
use crate::suggestions::SuggestionCoordinator;
use crate::validator::RejectionKind;
use crate::validator::validate;

/// Whether a key event was consumed. `Ignored` lets the host apply its
/// default edit behavior for the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

pub struct ComposeboxSession {
    config: SessionConfig,
    tx: SessionRequestSender,
    input: String,
    /// Set by the host when the single-line input has soft-wrapped.
    soft_wrapped: bool,
    attachments: AttachmentStore,
    suggestions: SuggestionCoordinator,
    navigator: SelectionNavigator,
    mode: SessionModeController,
    recent_tabs: Vec<TabInfo>,
}

impl ComposeboxSession {
    pub fn new(config: SessionConfig, tx: SessionRequestSender) -> Self {
        tx.send(SessionRequest::NotifySessionStarted);
        if config.show_recent_tab_chip {
            tx.send(SessionRequest::GetRecentTabs);
        }

        let mut suggestions = SuggestionCoordinator::new(tx.clone());
        // Session creation is the implicit empty-input generation, only
        // worth issuing when zero-prefix results can ever be shown.
        if config.show_zero_prefix_suggestions {
            suggestions.reconcile("");
        }

        Self {
            attachments: AttachmentStore::new(tx.clone()),
            suggestions,
            navigator: SelectionNavigator::default(),
            mode: SessionModeController::new(tx.clone()),
            config,
            tx,
            input: String::new(),
            soft_wrapped: false,
            recent_tabs: Vec::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The host's text field changed. A no-op when the text is unchanged.
    pub fn set_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.input {
            return;
        }
        self.input = text;
        self.navigator.reset();
        self.suggestions.reconcile_input(&self.input);
    }

    pub fn set_soft_wrapped(&mut self, soft_wrapped: bool) {
        self.soft_wrapped = soft_wrapped;
    }

    fn multiline(&self) -> bool {
        self.soft_wrapped || self.input.contains('\n')
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Down => self.navigate(true),
            KeyCode::Up => self.navigate(false),
            KeyCode::Tab => self.accept_smart_compose(),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                // Shift+Enter inserts a newline host-side, never submits.
                KeyOutcome::Ignored
            }
            KeyCode::Enter => {
                if self.submit() {
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
            KeyCode::Delete if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.delete_selected_match()
            }
            KeyCode::Esc => self.handle_escape(),
            _ => KeyOutcome::Ignored,
        }
    }

    fn navigate(&mut self, forward: bool) -> KeyOutcome {
        if !self.should_show_dropdown() {
            return KeyOutcome::Ignored;
        }
        let visible = self.suggestions.visible_indices();
        let selected = if forward {
            self.navigator.move_next(&visible)
        } else {
            self.navigator.move_previous(&visible)
        };
        let Some(index) = selected else {
            return KeyOutcome::Ignored;
        };
        // Fill the input from the selection without starting a new suggestion
        // generation; the match list must stay put while cycling through it.
        if let Some(m) = self.suggestions.matches().get(index) {
            self.input = m.fill_into_edit.clone();
        }
        self.suggestions.clear_smart_compose_hint();
        KeyOutcome::Handled
    }

    /// Append the pending smart-compose hint to the input. Single-shot per
    /// generation.
    pub fn accept_smart_compose(&mut self) -> KeyOutcome {
        let Some(hint) = self.suggestions.take_smart_compose_hint() else {
            return KeyOutcome::Ignored;
        };
        self.input.push_str(&hint);
        self.requery();
        KeyOutcome::Handled
    }

    /// Submit the session. Opens the selected or default match when one
    /// exists, otherwise falls back to a plain query submission. Returns
    /// `false` when the submission is suppressed (nothing to submit).
    pub fn submit(&mut self) -> bool {
        let trimmed = self.input.trim();
        if trimmed.is_empty() && self.attachments.live_count() == 0 {
            return false;
        }

        let target = self
            .navigator
            .selected()
            .or_else(|| self.suggestions.default_match_index());
        if let Some(index) = target
            && let Some(m) = self.suggestions.matches().get(index)
        {
            // Opening a match and submitting the query are exclusive.
            self.tx.send(SessionRequest::OpenAutocompleteMatch {
                index,
                destination: m.destination.clone(),
            });
            return true;
        }

        self.tx.send(SessionRequest::SubmitQuery {
            input: trimmed.to_string(),
        });
        true
    }

    /// Activate a match directly, e.g. a dropdown row click.
    pub fn open_match(&mut self, index: usize) {
        let Some(m) = self.suggestions.matches().get(index) else {
            return;
        };
        self.tx.send(SessionRequest::OpenAutocompleteMatch {
            index,
            destination: m.destination.clone(),
        });
    }

    fn handle_escape(&mut self) -> KeyOutcome {
        if self.config.close_by_escape {
            self.tx.send(SessionRequest::CloseSession {
                input: self.input.clone(),
            });
            return KeyOutcome::Handled;
        }
        if self.input.is_empty() {
            self.tx.send(SessionRequest::CloseSession {
                input: String::new(),
            });
        } else {
            self.set_input(String::new());
        }
        KeyOutcome::Handled
    }

    /// The clear button: first press empties text and attachments, a press
    /// with nothing left to clear closes the session.
    pub fn cancel(&mut self) {
        if self.input.is_empty() && self.attachments.live_count() == 0 {
            self.tx.send(SessionRequest::CloseSession {
                input: String::new(),
            });
            return;
        }
        self.attachments.clear();
        self.mode.sync_image_present(false);
        self.set_input(String::new());
    }

    /// Pasted content. Returns whether the paste was consumed; a text-only
    /// paste (no files) is left to the host's default handling.
    pub fn handle_paste(&mut self, files: Vec<CandidateFile>) -> bool {
        if files.is_empty() {
            return false;
        }
        self.attach_files(files);
        true
    }

    /// Validate and attach a batch of files, surfacing one notice per
    /// rejection kind.
    pub fn attach_files(&mut self, files: Vec<CandidateFile>) {
        let outcome = validate(files, self.attachments.live_count(), &self.config);
        for kind in &outcome.rejections {
            self.tx.send(SessionRequest::ValidationNotice(*kind));
        }
        let attached_any = !outcome.accepted.is_empty();
        for file in outcome.accepted {
            self.attachments.attach(file);
        }
        if attached_any {
            self.mode.sync_image_present(self.attachments.has_image());
        }
    }

    pub fn attach_tab(&mut self, tab: TabInfo) {
        if self.attachments.contains_tab(tab.tab_id) {
            return;
        }
        if self.attachments.live_count() >= self.config.file_max_count {
            self.tx
                .send(SessionRequest::ValidationNotice(RejectionKind::MaxFilesReached));
            return;
        }
        self.attachments.attach_tab(tab);
    }

    pub fn remove_attachment(&mut self, token: ContextToken) {
        let Some(record) = self.attachments.get(token) else {
            return;
        };
        let kind = record.kind;
        let was_ready = matches!(
            record.status,
            UploadStatus::SuggestSignalsReady | UploadStatus::Uploaded
        );
        if !self.attachments.remove(token) {
            return;
        }
        self.mode.sync_image_present(self.attachments.has_image());
        // Only a removal whose suggest signals could be baked into the
        // current results forces a new generation; dropping a still-uploading
        // attachment leaves the held match list intact.
        if was_ready && self.suggest_relevant(kind) {
            self.requery();
        }
    }

    pub fn on_upload_accepted(&mut self, client_token: ContextToken, backend_token: ContextToken) {
        self.attachments.on_upload_accepted(client_token, backend_token);
    }

    pub fn on_context_status_changed(
        &mut self,
        token: ContextToken,
        status: UploadStatus,
        error_kind: Option<UploadErrorKind>,
    ) {
        match self.attachments.on_status_changed(token, status, error_kind) {
            StatusOutcome::BecameReady(kind) if self.suggest_relevant(kind) => self.requery(),
            StatusOutcome::Removed { kind, was_ready } => {
                self.mode.sync_image_present(self.attachments.has_image());
                if was_ready && self.suggest_relevant(kind) {
                    self.requery();
                }
            }
            StatusOutcome::BecameReady(_) | StatusOutcome::Updated | StatusOutcome::Ignored => {}
        }
    }

    /// Host-initiated attachment, e.g. a visual selection capture. Arrives
    /// already uploaded.
    pub fn on_host_file_context(&mut self, token: ContextToken, info: SelectedFileInfo) {
        self.attachments.attach_host_file(token, info);
        self.mode.sync_image_present(self.attachments.has_image());
        if self.suggest_relevant(AttachmentKind::Image) {
            self.requery();
        }
    }

    pub fn on_autocomplete_result(&mut self, result: AutocompleteResult) {
        if self.suggestions.on_result(result, &self.input) {
            let visible = self.suggestions.visible_indices();
            self.navigator.on_matches_refreshed(&visible);
            // A refresh only carries a selection when it restored one after a
            // deletion; behave like navigation onto that row and fill the
            // input, without starting a new generation.
            if let Some(index) = self.navigator.selected()
                && let Some(m) = self.suggestions.matches().get(index)
            {
                self.input = m.fill_into_edit.clone();
            }
        }
    }

    pub fn on_recent_tabs(&mut self, tabs: Vec<TabInfo>) {
        self.recent_tabs = tabs;
    }

    /// The one-tap tab chip next to the dropdown: the most recent tab the
    /// host flagged for it that is not already attached.
    pub fn recent_tab_chip(&self) -> Option<&TabInfo> {
        if !self.config.show_recent_tab_chip || !self.should_show_dropdown() {
            return None;
        }
        self.recent_tabs
            .iter()
            .find(|tab| tab.show_in_recent_tab_chip && !self.attachments.contains_tab(tab.tab_id))
    }

    pub fn accept_recent_tab_chip(&mut self) {
        if let Some(tab) = self.recent_tab_chip().cloned() {
            self.attach_tab(tab);
        }
    }

    fn delete_selected_match(&mut self) -> KeyOutcome {
        match self.navigator.selected() {
            Some(index) => {
                self.delete_match_at(index);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        }
    }

    /// Request deletion of a match. Deleting the selected match remembers its
    /// visible position so the refreshed list can re-select whatever lands
    /// there; deleting an unselected one (the row's remove affordance) leaves
    /// nothing selected.
    pub fn delete_match_at(&mut self, index: usize) {
        let Some(m) = self.suggestions.matches().get(index) else {
            return;
        };
        if !m.supports_deletion {
            return;
        }
        let destination = m.destination.clone();
        if self.navigator.selected() == Some(index) {
            let visible = self.suggestions.visible_indices();
            if let Some(position) = visible.iter().position(|&i| i == index) {
                self.navigator.note_deleted(position);
            }
        }
        self.tx
            .send(SessionRequest::DeleteAutocompleteMatch { index, destination });
    }

    pub fn should_show_dropdown(&self) -> bool {
        self.suggestions.should_show_dropdown(
            self.attachments.live_count(),
            self.multiline(),
            self.attachments.has_image(),
            &self.config,
        )
    }

    pub fn matches(&self) -> &[AutocompleteMatch] {
        self.suggestions.matches()
    }

    pub fn visible_match_indices(&self) -> Vec<usize> {
        self.suggestions.visible_indices()
    }

    pub fn selected_match_index(&self) -> Option<usize> {
        self.navigator.selected()
    }

    pub fn smart_compose_hint(&self) -> Option<&str> {
        self.suggestions.smart_compose_hint()
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    pub fn mode(&self) -> SessionMode {
        self.mode.mode()
    }

    pub fn enter_create_image_mode(&mut self) {
        if !self.config.show_create_image_mode {
            return;
        }
        self.mode.enter_create_image(self.attachments.has_image());
    }

    pub fn exit_create_image_mode(&mut self) {
        self.mode.exit_create_image(self.attachments.has_image());
    }

    pub fn enter_deep_search_mode(&mut self) {
        self.mode.enter_deep_search();
    }

    pub fn exit_deep_search_mode(&mut self) {
        self.mode.exit_deep_search();
    }

    pub fn placeholder_text(&self) -> &str {
        self.mode.placeholder_text(&self.config)
    }

    /// Text entry and submission are blocked in create-image mode, or when
    /// the sole attachment slot is taken by something the user cannot trade
    /// out for a query refinement.
    pub fn inputs_disabled(&self) -> bool {
        if self.mode.mode().is_create_image() {
            return true;
        }
        let live = self.attachments.live_attachments();
        live.len() >= self.config.file_max_count
            && live.len() == 1
            && (live[0].kind == AttachmentKind::File || !live[0].is_deletable)
    }

    /// Attachment entry points grey out at capacity regardless of kind.
    pub fn upload_buttons_disabled(&self) -> bool {
        self.attachments.live_count() >= self.config.file_max_count
    }

    fn suggest_relevant(&self, kind: AttachmentKind) -> bool {
        kind != AttachmentKind::Image || self.config.show_image_suggestions
    }

    fn requery(&mut self) {
        self.navigator.reset();
        self.suggestions.reconcile(&self.input);
    }
}
