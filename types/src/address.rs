//! Account address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger account address.
///
/// Implicit accounts carry a `tz1`/`tz2`/`tz3` prefix, originated contracts
/// a `KT1` prefix. Addresses arrive from untrusted directory records as well
/// as from the local account model, so construction never panics; callers
/// that need a well-formed address check [`Address::is_valid`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Prefixes of implicit (spendable) accounts.
    pub const IMPLICIT_PREFIXES: [&'static str; 3] = ["tz1", "tz2", "tz3"];

    /// Prefix of originated contract accounts.
    pub const CONTRACT_PREFIX: &'static str = "KT1";

    /// Create an address from a raw string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address denotes an implicit account.
    pub fn is_implicit(&self) -> bool {
        Self::IMPLICIT_PREFIXES
            .iter()
            .any(|p| self.0.starts_with(p))
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        (self.is_implicit() || self.0.starts_with(Self::CONTRACT_PREFIX))
            && self.0.len() > Self::CONTRACT_PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_prefixes_recognised() {
        assert!(Address::new("tz1WCd2jm4uSt4vntk4vSuUWoZQGhLcDuR9q").is_implicit());
        assert!(Address::new("tz3bTdwZinP8U1JmSweNzVKhmwafqWmFWRfk").is_implicit());
        assert!(!Address::new("KT1GdNaQowD3mvcqkz2JuDtjtN8QnqKkkssj").is_implicit());
    }

    #[test]
    fn contract_address_is_valid_but_not_implicit() {
        let addr = Address::new("KT1GdNaQowD3mvcqkz2JuDtjtN8QnqKkkssj");
        assert!(addr.is_valid());
        assert!(!addr.is_implicit());
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(!Address::new("not-an-address").is_valid());
        assert!(!Address::new("").is_valid());
        assert!(!Address::new("tz1").is_valid());
    }
}
