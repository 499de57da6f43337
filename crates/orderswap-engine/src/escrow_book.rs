//! Escrow accounting invariant checker.
//!
//! Invariant enforced between calls:
//! ```text
//! ∀ asset: custody.balance_of(engine) == Σ locked == Σ offered_amount(OPEN orders)
//! ```
//!
//! Desired-asset funds pass through the engine only inside a single
//! fulfillment call, so between calls the engine holds exactly the escrow
//! of its open orders.

use std::collections::HashMap;

use orderswap_types::{Amount, AssetId, Result, SwapError};
use rust_decimal::Decimal;

/// Running per-asset escrow totals.
#[derive(Debug, Clone, Default)]
pub struct EscrowBook {
    locked: HashMap<AssetId, Amount>,
}

impl EscrowBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record funds entering escrow.
    pub fn lock(&mut self, asset: &AssetId, amount: Amount) {
        *self.locked.entry(asset.clone()).or_insert(Decimal::ZERO) += amount;
    }

    /// Record funds leaving escrow.
    ///
    /// # Errors
    /// Returns `EscrowInvariantViolation` if more is released than is locked.
    pub fn release(&mut self, asset: &AssetId, amount: Amount) -> Result<()> {
        let held = self.locked(asset);
        if held < amount {
            return Err(SwapError::EscrowInvariantViolation {
                reason: format!("release of {amount} {asset} exceeds locked {held}"),
            });
        }
        let remaining = held - amount;
        if remaining.is_zero() {
            self.locked.remove(asset);
        } else {
            self.locked.insert(asset.clone(), remaining);
        }
        Ok(())
    }

    #[must_use]
    pub fn locked(&self, asset: &AssetId) -> Amount {
        self.locked.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Assets with a non-zero escrow, sorted.
    #[must_use]
    pub fn assets(&self) -> Vec<AssetId> {
        let mut assets: Vec<AssetId> = self.locked.keys().cloned().collect();
        assets.sort();
        assets
    }

    /// Compare the book against what custody reports and what the ledger
    /// says is open.
    ///
    /// # Errors
    /// Returns [`SwapError::EscrowInvariantViolation`] on any mismatch.
    pub fn verify(&self, asset: &AssetId, custodied: Amount, open_total: Amount) -> Result<()> {
        let booked = self.locked(asset);
        if custodied != booked || booked != open_total {
            return Err(SwapError::EscrowInvariantViolation {
                reason: format!(
                    "asset {asset}: custodied {custodied}, booked {booked}, open orders {open_total}"
                ),
            });
        }
        Ok(())
    }
}
