use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::StoreError;

/// Identifier for a stored document.
///
/// Ids are random v4 UUIDs, rendered without hyphens (32 lowercase hex
/// characters). Generation needs no store coordination, so two concurrent
/// creates can never collide. Parsing accepts the standard textual UUID
/// forms and canonicalizes them, so `to_string()` of a parsed id is always
/// the stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for DocumentId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(s.to_string()))
    }
}
