use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Opaque 128-bit token identifying one piece of attached context.
///
/// The session controller synthesizes a token at attach time so the record can
/// be rendered optimistically; the upload backend may later hand back its own
/// token for the same context, which replaces the synthesized one. Both sides
/// treat the value as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextToken(Uuid);

impl ContextToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid context token: {0}")]
pub struct InvalidContextToken(String);

impl FromStr for ContextToken {
    type Err = InvalidContextToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidContextToken(s.to_string()))
    }
}
