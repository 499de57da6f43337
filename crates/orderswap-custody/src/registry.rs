//! Multi-asset custody registry.
//!
//! Owns one [`TokenLedger`] per registered asset and exposes them through
//! [`AssetCustody`]. Checkpoints are full snapshots of the token ledgers;
//! minting is an owner-side action and is not part of the custody trait.

use std::collections::BTreeMap;

use orderswap_types::{
    to_base_units, AccountId, Amount, AssetConfig, AssetId, Result, SwapError, TransferError,
};
use rust_decimal::Decimal;

use crate::{
    custody::{AssetCustody, CustodyResult},
    supply_conservation::SupplyConservation,
    token::TokenLedger,
};

/// Saved token state of the assets an [`AssetRegistry`] checkpoint covers.
#[derive(Debug, Clone)]
pub struct RegistryCheckpoint(Vec<TokenLedger>);

/// In-memory custody over any number of fungible assets.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    tokens: BTreeMap<AssetId, TokenLedger>,
    supply: SupplyConservation,
}

impl AssetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with the given assets already registered.
    pub fn with_assets(configs: impl IntoIterator<Item = AssetConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register_asset(config)?;
        }
        Ok(registry)
    }

    pub fn register_asset(&mut self, config: AssetConfig) -> Result<()> {
        config.validate()?;
        if self.tokens.contains_key(&config.id) {
            return Err(SwapError::transfer(
                &config.id,
                TransferError::DuplicateAsset(config.id.clone()),
            ));
        }
        tracing::debug!(asset = %config.id, decimals = config.decimals, "Asset registered");
        self.tokens.insert(config.id.clone(), TokenLedger::new(config));
        Ok(())
    }

    #[must_use]
    pub fn assets(&self) -> Vec<AssetId> {
        self.tokens.keys().cloned().collect()
    }

    pub fn decimals(&self, asset: &AssetId) -> CustodyResult<u32> {
        Ok(self.ledger(asset)?.decimals())
    }

    /// Convert a human quantity of `asset` into base units.
    pub fn units(&self, asset: &AssetId, value: Decimal) -> Result<Amount> {
        let decimals = self
            .decimals(asset)
            .map_err(|e| SwapError::transfer(asset, e))?;
        to_base_units(value, decimals)
    }

    /// Create `amount` new units of `asset` for `to`.
    ///
    /// The asset's total supply is checked first, so an overflowing mint
    /// leaves both the token ledger and the supply record untouched.
    pub fn mint(&mut self, asset: &AssetId, to: AccountId, amount: Amount) -> CustodyResult<()> {
        self.ledger(asset)?;
        self.supply.supply_after_mint(asset, amount)?;
        self.ledger_mut(asset)?.mint(to, amount)?;
        self.supply.record_mint(asset, amount)?;
        tracing::debug!(asset = %asset, to = %to.short(), amount = %amount, "Minted");
        Ok(())
    }

    /// `owner` authorizes `spender` to pull up to `amount`.
    pub fn approve(
        &mut self,
        asset: &AssetId,
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> CustodyResult<()> {
        self.ledger_mut(asset)?.approve(owner, spender, amount)
    }

    /// Σbalances == Σminted for `asset`.
    pub fn verify_supply(&self, asset: &AssetId) -> CustodyResult<()> {
        let actual = self
            .ledger(asset)?
            .total_supply()
            .ok_or_else(|| TransferError::SupplyOverflow(asset.clone()))?;
        self.supply.verify(asset, actual)
    }

    /// Check conservation for every registered asset.
    pub fn verify_all_supply(&self) -> CustodyResult<()> {
        self.tokens.keys().try_for_each(|asset| self.verify_supply(asset))
    }

    fn ledger(&self, asset: &AssetId) -> CustodyResult<&TokenLedger> {
        self.tokens
            .get(asset)
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))
    }

    fn ledger_mut(&mut self, asset: &AssetId) -> CustodyResult<&mut TokenLedger> {
        self.tokens
            .get_mut(asset)
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))
    }
}

impl AssetCustody for AssetRegistry {
    type Checkpoint = RegistryCheckpoint;

    fn balance_of(&self, asset: &AssetId, holder: AccountId) -> CustodyResult<Amount> {
        Ok(self.ledger(asset)?.balance_of(holder))
    }

    fn allowance(
        &self,
        asset: &AssetId,
        owner: AccountId,
        spender: AccountId,
    ) -> CustodyResult<Amount> {
        Ok(self.ledger(asset)?.allowance(owner, spender))
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> CustodyResult<()> {
        self.ledger_mut(asset)?.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: AccountId,
        owner: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> CustodyResult<()> {
        self.ledger_mut(asset)?
            .transfer_from(spender, owner, to, amount)
    }

    /// Unknown assets are skipped; nothing can move in them anyway.
    fn checkpoint(&self, assets: &[&AssetId]) -> RegistryCheckpoint {
        let mut saved: Vec<TokenLedger> = Vec::with_capacity(assets.len());
        for asset in assets {
            if saved.iter().any(|t| t.asset() == *asset) {
                continue;
            }
            if let Some(token) = self.tokens.get(*asset) {
                saved.push(token.clone());
            }
        }
        RegistryCheckpoint(saved)
    }

    fn rollback(&mut self, checkpoint: RegistryCheckpoint) {
        for token in checkpoint.0 {
            tracing::debug!(asset = %token.asset(), "Custody rolled back to checkpoint");
            self.tokens.insert(token.asset().clone(), token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn registry() -> (AssetRegistry, AssetId, AssetId) {
        let web3 = AssetId::new("WEB3");
        let guz = AssetId::new("GUZ");
        let reg = AssetRegistry::with_assets([
            AssetConfig::standard(web3.clone()),
            AssetConfig::new(guz.clone(), 6),
        ])
        .unwrap();
        (reg, web3, guz)
    }

    #[test]
    fn duplicate_registration_rejected() {
        let (mut reg, web3, _) = registry();
        let err = reg.register_asset(AssetConfig::standard(web3)).unwrap_err();
        assert!(matches!(
            err,
            SwapError::TransferFailed {
                source: TransferError::DuplicateAsset(_),
                ..
            }
        ));
    }

    #[test]
    fn unknown_asset_errors() {
        let (mut reg, _, _) = registry();
        let ghost = AssetId::new("GHOST");
        let err = reg.mint(&ghost, AccountId::new(), dec(1)).unwrap_err();
        assert_eq!(err, TransferError::UnknownAsset(ghost.clone()));
        assert!(reg.balance_of(&ghost, AccountId::new()).is_err());
    }

    #[test]
    fn units_follow_asset_precision() {
        let (reg, web3, guz) = registry();
        assert_eq!(
            reg.units(&web3, dec(1)).unwrap().to_string(),
            "1000000000000000000"
        );
        assert_eq!(reg.units(&guz, dec(20)).unwrap(), dec(20_000_000));
    }

    #[test]
    fn assets_are_isolated() {
        let (mut reg, web3, guz) = registry();
        let alice = AccountId::new();
        reg.mint(&web3, alice, dec(500)).unwrap();
        assert_eq!(reg.balance_of(&web3, alice).unwrap(), dec(500));
        assert_eq!(reg.balance_of(&guz, alice).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn rollback_restores_balances_and_allowances() {
        let (mut reg, web3, _) = registry();
        let (owner, engine) = (AccountId::new(), AccountId::new());
        reg.mint(&web3, owner, dec(100)).unwrap();
        reg.approve(&web3, owner, engine, dec(100)).unwrap();

        let cp = reg.checkpoint(&[&web3]);
        reg.transfer_from(&web3, engine, owner, engine, dec(100))
            .unwrap();
        assert_eq!(reg.balance_of(&web3, engine).unwrap(), dec(100));
        assert_eq!(reg.allowance(&web3, owner, engine).unwrap(), Decimal::ZERO);

        reg.rollback(cp);
        assert_eq!(reg.balance_of(&web3, owner).unwrap(), dec(100));
        assert_eq!(reg.balance_of(&web3, engine).unwrap(), Decimal::ZERO);
        assert_eq!(reg.allowance(&web3, owner, engine).unwrap(), dec(100));
        reg.verify_all_supply().unwrap();
    }

    #[test]
    fn overflowing_mint_leaves_state_untouched() {
        let (mut reg, web3, _) = registry();
        let (alice, bob) = (AccountId::new(), AccountId::new());
        let half = Decimal::from_i128_with_scale(1_i128 << 95, 0);
        reg.mint(&web3, alice, half).unwrap();

        let err = reg.mint(&web3, bob, half).unwrap_err();
        assert_eq!(err, TransferError::SupplyOverflow(web3.clone()));
        assert_eq!(reg.balance_of(&web3, bob).unwrap(), Decimal::ZERO);
        assert_eq!(reg.balance_of(&web3, alice).unwrap(), half);
        reg.verify_supply(&web3).unwrap();

        // Moving the whole supply around stays within range.
        reg.transfer(&web3, alice, bob, half).unwrap();
        reg.verify_supply(&web3).unwrap();
    }

    #[test]
    fn checkpoint_covers_only_named_assets() {
        let (mut reg, web3, guz) = registry();
        let (a, b) = (AccountId::new(), AccountId::new());
        reg.mint(&web3, a, dec(10)).unwrap();
        reg.mint(&guz, a, dec(10)).unwrap();

        let cp = reg.checkpoint(&[&web3, &web3, &AssetId::new("GHOST")]);
        assert_eq!(cp.0.len(), 1);
        reg.transfer(&web3, a, b, dec(4)).unwrap();
        reg.transfer(&guz, a, b, dec(3)).unwrap();
        reg.rollback(cp);

        assert_eq!(reg.balance_of(&web3, b).unwrap(), Decimal::ZERO);
        assert_eq!(reg.balance_of(&guz, b).unwrap(), dec(3));
        reg.verify_all_supply().unwrap();
    }

    #[test]
    fn supply_conserved_across_transfers() {
        let (mut reg, web3, guz) = registry();
        let (a, b) = (AccountId::new(), AccountId::new());
        reg.mint(&web3, a, dec(500)).unwrap();
        reg.mint(&guz, b, dec(500)).unwrap();
        reg.transfer(&web3, a, b, dec(200)).unwrap();
        reg.transfer(&guz, b, a, dec(50)).unwrap();
        reg.verify_all_supply().unwrap();
    }
}
