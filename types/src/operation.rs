//! The operation model the delegation engine reads.
//!
//! Operations are supplied by the synchronization layer and are read-only
//! here. Confirmed operations are ordered newest-first (index 0 = most
//! recent); pending operations are optimistic local injections that have not
//! been seen in a confirmed block yet.

use serde::{Deserialize, Serialize};

use crate::{Address, OpHash, Timestamp};

/// The kind of an operation, as classified by the synchronization layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    /// Funds received by the account.
    In,
    /// Funds sent from the account.
    Out,
    /// The account delegated to a baker.
    Delegate,
    /// The account cleared its delegation.
    Undelegate,
    /// Public key reveal (first outgoing operation of a fresh account).
    Reveal,
}

impl OperationType {
    /// Whether this operation establishes or clears a delegation.
    pub fn is_delegation_kind(&self) -> bool {
        matches!(self, Self::Delegate | Self::Undelegate)
    }
}

/// A single operation in an account's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub op_type: OperationType,
    /// When the operation was included (confirmed) or injected (pending).
    pub date: Timestamp,
    /// Hash assigned at injection time; stable across the pending/confirmed
    /// transition, which is how the two lists are matched.
    pub hash: OpHash,
    /// Destination addresses. For delegation operations the first entry is
    /// the baker being delegated to.
    pub recipients: Vec<Address>,
    /// Whether the operation was included but failed. Only meaningful for
    /// confirmed operations; always `false` on pending ones.
    pub has_failed: bool,
}

impl Operation {
    /// The primary recipient, if any.
    pub fn first_recipient(&self) -> Option<&Address> {
        self.recipients.first()
    }
}
