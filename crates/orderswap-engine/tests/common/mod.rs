//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use chrono::DateTime;
use orderswap_custody::{AssetCustody, AssetRegistry, CustodyResult};
use orderswap_engine::{ManualClock, SwapEngine};
use orderswap_types::{AccountId, Amount, AssetConfig, AssetId, EngineConfig, TransferError};
use rust_decimal::Decimal;

pub const START: i64 = 1_700_000_000;

pub fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

pub fn web3() -> AssetId {
    AssetId::new("WEB3")
}

pub fn guz() -> AssetId {
    AssetId::new("GUZ")
}

/// Custody that delegates to an [`AssetRegistry`] but rejects the n-th
/// push (`transfer`) counted from when it was armed.
pub struct FlakyCustody {
    pub inner: AssetRegistry,
    fail_on_push: Option<usize>,
    pushes: usize,
}

impl FlakyCustody {
    pub fn new(inner: AssetRegistry) -> Self {
        Self {
            inner,
            fail_on_push: None,
            pushes: 0,
        }
    }

    /// Fail the `n`-th push from now on (1-based).
    pub fn fail_push(&mut self, n: usize) {
        self.fail_on_push = Some(n);
        self.pushes = 0;
    }
}

impl AssetCustody for FlakyCustody {
    type Checkpoint = <AssetRegistry as AssetCustody>::Checkpoint;

    fn balance_of(&self, asset: &AssetId, holder: AccountId) -> CustodyResult<Amount> {
        self.inner.balance_of(asset, holder)
    }

    fn allowance(
        &self,
        asset: &AssetId,
        owner: AccountId,
        spender: AccountId,
    ) -> CustodyResult<Amount> {
        self.inner.allowance(asset, owner, spender)
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> CustodyResult<()> {
        self.pushes += 1;
        if self.fail_on_push == Some(self.pushes) {
            return Err(TransferError::InsufficientBalance {
                needed: amount,
                available: Decimal::ZERO,
            });
        }
        self.inner.transfer(asset, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: AccountId,
        owner: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> CustodyResult<()> {
        self.inner.transfer_from(asset, spender, owner, to, amount)
    }

    fn checkpoint(&self, assets: &[&AssetId]) -> Self::Checkpoint {
        self.inner.checkpoint(assets)
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        self.inner.rollback(checkpoint);
    }
}

/// A registry with WEB3 and GUZ at zero decimals (amounts are base units).
pub fn registry() -> AssetRegistry {
    AssetRegistry::with_assets([AssetConfig::new(web3(), 0), AssetConfig::new(guz(), 0)]).unwrap()
}

pub fn clock() -> ManualClock {
    ManualClock::new(DateTime::from_timestamp(START, 0).unwrap())
}

pub struct Harness<C: AssetCustody> {
    pub engine: SwapEngine<C>,
    pub clock: ManualClock,
}

impl Harness<AssetRegistry> {
    pub fn new(config: EngineConfig) -> Self {
        let clock = clock();
        let engine = SwapEngine::new(AccountId::new(), registry(), clock.clone(), config).unwrap();
        Self { engine, clock }
    }
}

impl Harness<FlakyCustody> {
    pub fn flaky() -> Self {
        let clock = clock();
        let engine = SwapEngine::new(
            AccountId::new(),
            FlakyCustody::new(registry()),
            clock.clone(),
            EngineConfig::default(),
        )
        .unwrap();
        Self { engine, clock }
    }

    pub fn registry_mut(&mut self) -> &mut AssetRegistry {
        &mut self.engine.custody_mut().inner
    }

    pub fn fund(&mut self, asset: &AssetId, holder: AccountId, amount: i64) {
        let engine_acct = self.engine.account();
        let registry = self.registry_mut();
        registry.mint(asset, holder, dec(amount)).unwrap();
        registry
            .approve(asset, holder, engine_acct, dec(amount))
            .unwrap();
    }
}

impl Harness<AssetRegistry> {
    /// Mint `amount` to `holder` and approve the engine for all of it.
    pub fn fund(&mut self, asset: &AssetId, holder: AccountId, amount: i64) {
        let engine_acct = self.engine.account();
        let registry = self.engine.custody_mut();
        registry.mint(asset, holder, dec(amount)).unwrap();
        registry
            .approve(asset, holder, engine_acct, dec(amount))
            .unwrap();
    }
}

impl<C: AssetCustody> Harness<C> {
    pub fn balance(&self, asset: &AssetId, holder: AccountId) -> Decimal {
        self.engine.custody().balance_of(asset, holder).unwrap()
    }

    pub fn held(&self, asset: &AssetId) -> Decimal {
        self.balance(asset, self.engine.account())
    }
}
