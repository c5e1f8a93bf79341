//! Staking engine for the tzwallet core.
//!
//! Derives an account's delegation state purely from its local operation
//! history and resolves the matching baker through the shared
//! [`BakerDirectory`](tzwallet_bakers::BakerDirectory):
//! - Delegation derivation — reconciling confirmed and pending operations,
//!   with pre-send/pre-receive warning flags
//! - Directory-backed resolution and whitelist-ordered baker listings
//! - Random baker selection for the delegation flow

pub mod delegation;
pub mod error;
pub mod selection;

pub use delegation::{
    account_delegation, is_account_delegating, load_account_delegation, Delegation,
};
pub use error::WalletError;
pub use selection::{list_bakers, pick_random_baker};
