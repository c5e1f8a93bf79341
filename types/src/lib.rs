//! Fundamental types for the tzwallet staking core.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, operation hashes, timestamps, and the read-only
//! account/operation model the delegation engine derives its state from.

pub mod account;
pub mod address;
pub mod hash;
pub mod operation;
pub mod time;

pub use account::Account;
pub use address::Address;
pub use hash::OpHash;
pub use operation::{Operation, OperationType};
pub use time::Timestamp;
