//! Suggestion-backend data model: one autocomplete match per dropdown row,
//! plus the batched result the backend pushes after a query.

use serde::Deserialize;
use serde::Serialize;
use url::Url;

/// Opaque destination handle passed back verbatim on open/delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationRef(Url);

impl DestinationRef {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

/// One suggestion row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteMatch {
    /// Content shown in the row.
    pub contents: String,
    /// Text inserted into the input when the row is selected.
    pub fill_into_edit: String,
    /// Whether this match may be opened as the default on submit.
    pub allowed_to_be_default_match: bool,
    /// "Search for exactly what was typed" row. By backend convention this is
    /// always the first match in the list when present.
    pub is_verbatim: bool,
    pub supports_deletion: bool,
    pub destination: DestinationRef,
}

/// Batched autocomplete response, tagged with the input it was computed for so
/// stale responses can be discarded mechanically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteResult {
    /// The input string the backend computed these matches for.
    pub input: String,
    /// Insertion order is backend response order.
    pub matches: Vec<AutocompleteMatch>,
    /// Optional trailing-completion hint, independent from the match list.
    pub smart_compose_hint: Option<String>,
}
