//! Single-asset fungible token ledger.
//!
//! Tracks per-account balances and per-(owner, spender) allowances with
//! ERC-20 semantics. All mutations are atomic: either the full operation
//! succeeds or the ledger is unchanged.

use std::collections::HashMap;

use orderswap_types::{is_whole, AccountId, Amount, AssetConfig, AssetId, TransferError};
use rust_decimal::Decimal;

use crate::custody::CustodyResult;

/// Balances and allowances for one asset.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    config: AssetConfig,
    balances: HashMap<AccountId, Amount>,
    /// Keyed by (owner, spender).
    allowances: HashMap<(AccountId, AccountId), Amount>,
}

impl TokenLedger {
    #[must_use]
    pub fn new(config: AssetConfig) -> Self {
        Self {
            config,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    #[must_use]
    pub fn asset(&self) -> &AssetId {
        &self.config.id
    }

    #[must_use]
    pub fn decimals(&self) -> u32 {
        self.config.decimals
    }

    /// Create `amount` new units in `to`'s balance.
    pub fn mint(&mut self, to: AccountId, amount: Amount) -> CustodyResult<()> {
        check_amount(amount)?;
        let credited = self.credit(to, amount)?;
        self.balances.insert(to, credited);
        Ok(())
    }

    /// Set the amount `spender` may pull from `owner`. Overwrites any
    /// previous approval.
    pub fn approve(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    ) -> CustodyResult<()> {
        check_amount(amount)?;
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
        Ok(())
    }

    #[must_use]
    pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Amount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn balance_of(&self, holder: AccountId) -> Amount {
        self.balances.get(&holder).copied().unwrap_or(Decimal::ZERO)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// - `InvalidAmount` if negative or fractional
    /// - `InsufficientBalance` if `from` holds less than `amount`
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> CustodyResult<()> {
        check_amount(amount)?;
        let available = self.balance_of(from);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self.credit(to, amount)?;
        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }

    /// `spender` moves `amount` from `owner` to `to`, consuming allowance.
    ///
    /// Allowance is checked before balance; neither is touched on failure.
    pub fn transfer_from(
        &mut self,
        spender: AccountId,
        owner: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> CustodyResult<()> {
        check_amount(amount)?;
        let approved = self.allowance(owner, spender);
        if approved < amount {
            return Err(TransferError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        self.transfer(owner, to, amount)?;
        self.approve(owner, spender, approved - amount)
    }

    /// `holder`'s balance after receiving `amount`.
    fn credit(&self, holder: AccountId, amount: Amount) -> CustodyResult<Amount> {
        self.balance_of(holder)
            .checked_add(amount)
            .ok_or_else(|| TransferError::SupplyOverflow(self.asset().clone()))
    }

    /// Sum of every balance, or `None` if it does not fit in an [`Amount`].
    #[must_use]
    pub fn total_supply(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(*b))
    }

    /// Number of accounts with a non-zero balance.
    #[must_use]
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| !b.is_zero()).count()
    }
}

fn check_amount(amount: Amount) -> CustodyResult<()> {
    if amount.is_sign_negative() || !is_whole(amount) {
        return Err(TransferError::InvalidAmount(amount));
    }
    Ok(())
}
