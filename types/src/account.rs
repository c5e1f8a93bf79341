//! The read-only account view the delegation engine operates on.

use serde::{Deserialize, Serialize};

use crate::{Address, Operation};

/// An account as maintained by the synchronization layer.
///
/// The staking core never mutates an account; it only derives delegation
/// state from the two operation lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    /// Confirmed operations, ordered newest-first.
    pub operations: Vec<Operation>,
    /// Optimistic operations injected locally but not yet confirmed.
    pub pending_operations: Vec<Operation>,
}

impl Account {
    /// An account with no history, e.g. freshly imported.
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            operations: Vec::new(),
            pending_operations: Vec::new(),
        }
    }
}
