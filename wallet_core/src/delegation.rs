//! Delegation state derivation.
//!
//! An account's delegation is never stored; it is recomputed on demand from
//! the confirmed and pending operation lists. Only resolved baker lookups go
//! through the directory cache.

use tzwallet_bakers::{Baker, BakerDirectory};
use tzwallet_types::{Account, Address, Operation, OperationType};

use crate::error::WalletError;

/// An account's current delegation, derived from its operation history.
#[derive(Clone, Debug)]
pub struct Delegation {
    /// The baker being delegated to.
    pub address: Address,
    /// The directory entry for that baker; `None` until resolved (the UI
    /// renders "Unknown" for bakers the directory does not list).
    pub baker: Option<Baker>,
    /// The operation that established or changed the delegation (carries the
    /// date info).
    pub operation: Operation,
    /// True if a delegation change is still awaiting confirmation
    /// (optimistic update).
    pub is_pending: bool,
    /// True if a send should inform the user it will top down the delegation.
    pub send_should_warn_delegation: bool,
    /// True if a receive should inform the user it will top up the
    /// delegation.
    pub receive_should_warn_delegation: bool,
}

/// Derive the account's delegation from its local history alone.
///
/// The newest confirmed, non-failed `Delegate`/`Undelegate` operation is the
/// baseline. A pending `Delegate` with no confirmed counterpart (matched by
/// hash) takes precedence over it; a pending `Undelegate` never does, though
/// it still marks the result as pending. Returns `None` when the account is
/// not delegating — no relevant operation, or the authoritative one is an
/// `Undelegate`.
pub fn account_delegation(account: &Account) -> Option<Delegation> {
    let confirmed = account
        .operations
        .iter()
        .find(|op| !op.has_failed && op.op_type.is_delegation_kind());
    let pending = account
        .pending_operations
        .iter()
        .filter(|p| !account.operations.iter().any(|o| o.hash == p.hash))
        .find(|p| p.op_type.is_delegation_kind());

    let is_pending = pending.is_some();
    let operation = match pending {
        Some(p) if p.op_type == OperationType::Delegate => p,
        _ => confirmed?,
    };
    if operation.op_type == OperationType::Undelegate {
        return None;
    }
    let address = operation.first_recipient()?.clone();

    // Everything confirmed since the authoritative operation, plus all
    // pending operations, decides whether warnings still apply.
    let recent: Vec<&Operation> = account
        .operations
        .iter()
        .filter(|op| op.date > operation.date)
        .chain(account.pending_operations.iter())
        .collect();
    let send_should_warn_delegation = !recent.iter().any(|op| op.op_type == OperationType::Out);
    let receive_should_warn_delegation = !recent.iter().any(|op| op.op_type == OperationType::In);

    Some(Delegation {
        address,
        baker: None,
        operation: operation.clone(),
        is_pending,
        send_should_warn_delegation,
        receive_should_warn_delegation,
    })
}

/// Whether the account currently delegates to any baker.
pub fn is_account_delegating(account: &Account) -> bool {
    account_delegation(account).is_some()
}

/// Derive the delegation and resolve its baker through the directory.
///
/// Cache-first: a baker already present in the last known snapshot is
/// attached without fetching; on a cold cache one (shared) fetch is awaited.
/// A baker the directory does not list leaves `baker` as `None`.
pub async fn load_account_delegation(
    directory: &BakerDirectory,
    account: &Account,
) -> Result<Option<Delegation>, WalletError> {
    let Some(mut delegation) = account_delegation(account) else {
        return Ok(None);
    };
    delegation.baker = directory.load_baker(&delegation.address).await?;
    Ok(Some(delegation))
}
