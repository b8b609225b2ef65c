//! Serializes suggestion-backend traffic into strict stop-then-query cycles.
//!
//! Every triggering event (input change, attachment readiness, attachment
//! removal, hint acceptance, session creation) funnels through
//! [`SuggestionCoordinator::reconcile`], the only entry point allowed to
//! mutate suggestion state. A cycle clears `matches` and the smart-compose
//! hint synchronously, sends `StopAutocomplete`, then issues the new query,
//! so the UI can never render a response computed for generation N-1 after
//! generation N has started. Responses are tagged by the input they were
//! computed for; a mismatch against `queried_input` discards them on arrival
//! (last-query-wins).

use composebox_protocol::autocomplete::AutocompleteMatch;
use composebox_protocol::autocomplete::AutocompleteResult;

use crate::config::SessionConfig;
use crate::events::SessionRequest;
use crate::events::SessionRequestSender;

pub struct SuggestionCoordinator {
    /// Bumped on every stop/query cycle.
    generation: u64,
    /// Last input a query was issued for; used both to suppress duplicate
    /// queries and to discard stale responses.
    queried_input: Option<String>,
    matches: Vec<AutocompleteMatch>,
    smart_compose_hint: Option<String>,
    tx: SessionRequestSender,
}

impl SuggestionCoordinator {
    pub fn new(tx: SessionRequestSender) -> Self {
        Self {
            generation: 0,
            queried_input: None,
            matches: Vec::new(),
            smart_compose_hint: None,
            tx,
        }
    }

    /// Start a new generation for `input`: stop the current query (clearing
    /// `matches` and the hint in the same synchronous step), then issue the
    /// new one.
    pub fn reconcile(&mut self, input: &str) {
        self.generation += 1;
        tracing::trace!("suggestion generation {} for {input:?}", self.generation);

        // Stop before query. The very first generation has nothing to stop.
        if self.queried_input.is_some() {
            self.matches.clear();
            self.smart_compose_hint = None;
            self.tx.send(SessionRequest::StopAutocomplete);
        }

        self.queried_input = Some(input.to_string());
        self.tx.send(SessionRequest::QueryAutocomplete {
            input: input.to_string(),
        });
    }

    /// [`SuggestionCoordinator::reconcile`] for free-text edits: a change to
    /// the same string a query is already out for is suppressed.
    pub fn reconcile_input(&mut self, input: &str) {
        if self.queried_input.as_deref() == Some(input) {
            return;
        }
        self.reconcile(input);
    }

    /// Apply a pushed autocomplete result. Returns whether the result was
    /// accepted; responses for anything other than the latest queried input
    /// are stale and dropped.
    pub fn on_result(&mut self, result: AutocompleteResult, live_input: &str) -> bool {
        if self.queried_input.as_deref() != Some(result.input.as_str()) {
            tracing::debug!(
                "discarding stale autocomplete result for {:?} (current: {:?})",
                result.input,
                self.queried_input
            );
            return false;
        }

        self.matches = result.matches;
        // The hint is only offered while the input it was computed for still
        // equals the live input verbatim.
        self.smart_compose_hint = result
            .smart_compose_hint
            .filter(|_| result.input == live_input);
        true
    }

    pub fn matches(&self) -> &[AutocompleteMatch] {
        &self.matches
    }

    /// Indices of matches shown to the user. In typed mode the verbatim row
    /// (index 0 by backend convention) is skipped both visually and for
    /// keyboard cycling.
    ///
    /// Typed-ness follows the input the matches were computed for, not the
    /// live text, so filling the input from a selection does not reshape the
    /// list mid-cycle.
    pub fn visible_indices(&self) -> Vec<usize> {
        let first = if self.typed_mode() { 1 } else { 0 };
        (first..self.matches.len()).collect()
    }

    fn typed_mode(&self) -> bool {
        self.queried_input
            .as_deref()
            .is_some_and(|input| !input.is_empty())
    }

    /// Index of the match opened on submit, if any.
    pub fn default_match_index(&self) -> Option<usize> {
        self.matches
            .iter()
            .position(|m| m.allowed_to_be_default_match)
    }

    pub fn smart_compose_hint(&self) -> Option<&str> {
        self.smart_compose_hint.as_deref()
    }

    /// Take the hint for acceptance; the hint is single-shot.
    pub fn take_smart_compose_hint(&mut self) -> Option<String> {
        self.smart_compose_hint.take()
    }

    /// Directional navigation and the hint are mutually exclusive within one
    /// generation.
    pub fn clear_smart_compose_hint(&mut self) {
        self.smart_compose_hint = None;
    }

    /// Whether the dropdown is rendered at all. A `false` here hides the
    /// dropdown without clearing `matches`, so the list reappears immediately
    /// once the blocking condition clears.
    pub fn should_show_dropdown(
        &self,
        live_attachment_count: usize,
        multiline: bool,
        image_present: bool,
        config: &SessionConfig,
    ) -> bool {
        if self.matches.is_empty() {
            return false;
        }
        if live_attachment_count > 1 {
            return false;
        }
        if multiline {
            return false;
        }
        if image_present && !config.show_image_suggestions {
            return false;
        }
        if self.typed_mode() {
            // Never render just the verbatim row on its own.
            config.show_typed_suggestions && self.matches.len() > 1
        } else {
            config.show_zero_prefix_suggestions
        }
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
