//! The baker entity and validated normalization of untrusted records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tzwallet_types::Address;

/// Whether a baker can accept further delegations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityStatus {
    /// Accepting delegations.
    Normal,
    /// Saturated; delegating to it would dilute rewards.
    Full,
}

/// A delegation target listed by the remote baker directory.
///
/// Only ever constructed through [`Baker::from_raw`] (or deserialized from a
/// snapshot this crate produced earlier), so every field has already passed
/// validation — no partially-valid `Baker` exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Baker {
    pub address: Address,
    /// Display label.
    pub name: String,
    /// Logo image URL; guaranteed to use an `http://` or `https://` scheme.
    pub logo_url: String,
    /// Human-readable yearly yield, e.g. `"5.34 %"`.
    pub nominal_yield: String,
    pub capacity_status: CapacityStatus,
}

impl Baker {
    /// Normalize one untrusted directory record.
    ///
    /// Succeeds only if `address`, `name`, and `logo` are strings, the logo
    /// URL uses an `http(s)` scheme, `freeSpace` and `estimatedRoi` are
    /// numbers, and the ROI lies within `[0, 1]`. Records failing any check
    /// are dropped by the caller, never surfaced as errors.
    pub fn from_raw(raw: &Value) -> Option<Baker> {
        let record = raw.as_object()?;
        let address = record.get("address")?.as_str()?;
        let name = record.get("name")?.as_str()?;
        let logo = record.get("logo")?.as_str()?;
        let free_space = record.get("freeSpace")?.as_f64()?;
        let roi = record.get("estimatedRoi")?.as_f64()?;

        if address.is_empty() {
            return None;
        }
        if !logo.starts_with("https://") && !logo.starts_with("http://") {
            return None;
        }
        if !(0.0..=1.0).contains(&roi) {
            return None;
        }

        Some(Baker {
            address: Address::new(address),
            name: name.to_string(),
            logo_url: logo.to_string(),
            nominal_yield: format_nominal_yield(roi),
            capacity_status: if free_space <= 0.0 {
                CapacityStatus::Full
            } else {
                CapacityStatus::Normal
            },
        })
    }
}

/// Render an ROI in `[0, 1]` as a percentage rounded down to two decimal
/// places, without trailing zeros: `0.1234` → `"12.34 %"`, `1` → `"100 %"`.
fn format_nominal_yield(roi: f64) -> String {
    let basis_points = (10_000.0 * roi).floor() as u32;
    let whole = basis_points / 100;
    let frac = basis_points % 100;
    if frac == 0 {
        format!("{whole} %")
    } else if frac % 10 == 0 {
        format!("{whole}.{} %", frac / 10)
    } else {
        format!("{whole}.{frac:02} %")
    }
}
