//! Baker selection helpers layered on top of the directory.

use std::collections::HashMap;

use rand::seq::SliceRandom;

use tzwallet_bakers::{Baker, BakerDirectory, CapacityStatus};
use tzwallet_types::Address;

use crate::error::WalletError;

/// List bakers filtered and reordered to match `whitelist`.
///
/// Serves from the directory (fetching once on a cold cache). Output order
/// follows the whitelist, not the directory; addresses the directory does
/// not list are silently dropped, and a duplicated whitelist entry produces
/// a duplicated output entry.
pub async fn list_bakers(
    directory: &BakerDirectory,
    whitelist: &[Address],
) -> Result<Vec<Baker>, WalletError> {
    let all = directory.get().await?;
    let by_address: HashMap<&Address, &Baker> = all.iter().map(|b| (&b.address, b)).collect();
    Ok(whitelist
        .iter()
        .filter_map(|addr| by_address.get(addr).map(|b| (*b).clone()))
        .collect())
}

/// Pick a baker uniformly at random, preferring those with free capacity.
///
/// Bakers marked `Full` are only drawn from when every baker in the list is
/// full. Returns `None` on an empty list.
pub fn pick_random_baker(bakers: &[Baker]) -> Option<&Baker> {
    let mut rng = rand::thread_rng();
    let open: Vec<&Baker> = bakers
        .iter()
        .filter(|b| b.capacity_status != CapacityStatus::Full)
        .collect();
    if !open.is_empty() {
        return open.choose(&mut rng).copied();
    }
    bakers.choose(&mut rng)
}
