//! Operation hash type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A base58-encoded operation hash, as reported by the indexer.
///
/// Pending (optimistic) operations carry the hash the node returned at
/// injection time; once the operation is confirmed the same hash appears in
/// the confirmed history, which is how the two are matched up.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpHash(String);

impl OpHash {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OpHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
