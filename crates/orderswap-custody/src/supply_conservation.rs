//! Supply conservation invariant checker.
//!
//! Invariant enforced over every custody state:
//! ```text
//! ∀ asset: Σ(balances) == Σ(minted)
//! ```
//!
//! Transfers, pulls, and rollbacks only move units between holders; none of
//! them may change the total.

use std::collections::HashMap;

use orderswap_types::{Amount, AssetId, TransferError};
use rust_decimal::Decimal;

use crate::custody::CustodyResult;

/// Tracks per-asset minted totals.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    minted: HashMap<AssetId, Amount>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply of `asset` after minting `amount`, without recording it.
    ///
    /// # Errors
    /// Returns [`TransferError::SupplyOverflow`] if the total would not fit.
    pub fn supply_after_mint(&self, asset: &AssetId, amount: Amount) -> CustodyResult<Amount> {
        self.expected_supply(asset)
            .checked_add(amount)
            .ok_or_else(|| TransferError::SupplyOverflow(asset.clone()))
    }

    pub fn record_mint(&mut self, asset: &AssetId, amount: Amount) -> CustodyResult<()> {
        let total = self.supply_after_mint(asset, amount)?;
        self.minted.insert(asset.clone(), total);
        Ok(())
    }

    /// Expected total supply for an asset.
    #[must_use]
    pub fn expected_supply(&self, asset: &AssetId) -> Amount {
        self.minted.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Verify that the sum of all balances matches what was minted.
    ///
    /// # Errors
    /// Returns [`TransferError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, asset: &AssetId, actual_supply: Amount) -> CustodyResult<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(TransferError::SupplyInvariantViolation {
                reason: format!("asset {asset}: actual supply {actual_supply} != minted {expected}"),
            });
        }
        Ok(())
    }

    /// All assets that have ever been minted, sorted.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<AssetId> {
        let mut assets: Vec<AssetId> = self.minted.keys().cloned().collect();
        assets.sort();
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        let btc = AssetId::new("BTC");
        assert_eq!(sc.expected_supply(&btc), Decimal::ZERO);
        assert!(sc.verify(&btc, Decimal::ZERO).is_ok());
    }

    #[test]
    fn mints_accumulate() {
        let mut sc = SupplyConservation::new();
        let guz = AssetId::new("GUZ");
        sc.record_mint(&guz, Decimal::new(1000, 0)).unwrap();
        sc.record_mint(&guz, Decimal::new(500, 0)).unwrap();
        assert_eq!(sc.expected_supply(&guz), Decimal::new(1500, 0));
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        let guz = AssetId::new("GUZ");
        sc.record_mint(&guz, Decimal::new(10, 0)).unwrap();
        let err = sc.verify(&guz, Decimal::new(11, 0)).unwrap_err();
        assert!(matches!(err, TransferError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn assets_are_independent_and_sorted() {
        let mut sc = SupplyConservation::new();
        sc.record_mint(&AssetId::new("WEB3"), Decimal::new(5, 0)).unwrap();
        sc.record_mint(&AssetId::new("GUZ"), Decimal::new(7, 0)).unwrap();
        assert_eq!(
            sc.tracked_assets(),
            vec![AssetId::new("GUZ"), AssetId::new("WEB3")]
        );
        assert!(sc.verify(&AssetId::new("WEB3"), Decimal::new(5, 0)).is_ok());
    }

    #[test]
    fn overflowing_mint_is_rejected_and_not_recorded() {
        let mut sc = SupplyConservation::new();
        let web3 = AssetId::new("WEB3");
        let half = Decimal::from_i128_with_scale(1_i128 << 95, 0);
        sc.record_mint(&web3, half).unwrap();
        assert_eq!(
            sc.record_mint(&web3, half),
            Err(TransferError::SupplyOverflow(web3.clone()))
        );
        assert_eq!(sc.expected_supply(&web3), half);
    }
}
