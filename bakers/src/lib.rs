//! Baker directory for the tzwallet staking core.
//!
//! Provides everything the staking flow needs to know about delegation
//! targets:
//! - The [`Baker`] entity, only ever constructed through validated
//!   normalization of untrusted directory records
//! - The [`BakerDirectory`] cache — one snapshot, shared fetches
//!   (get/force/hydrate)
//! - The [`BakerSource`] fetch seam with a reqwest-backed default and a
//!   controllable null implementation for tests

pub mod baker;
pub mod directory;
pub mod error;
pub mod source;

pub use baker::{Baker, CapacityStatus};
pub use directory::{BakerDirectory, Snapshot};
pub use error::DirectoryError;
pub use source::{BakerSource, HttpBakerSource, NullBakerSource};
