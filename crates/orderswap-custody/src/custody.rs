//! The custody interface the swap engine is written against.

use orderswap_types::{AccountId, Amount, AssetId, TransferError};

/// Result of a custody operation.
pub type CustodyResult<T> = std::result::Result<T, TransferError>;

/// Fungible-asset custody with allowance-gated pulls.
///
/// Implementations behave like a transactional host: `checkpoint` captures
/// the balance/allowance state of the named assets and `rollback` restores
/// it, so a caller can make a sequence of transfers all-or-nothing. Only
/// transfers in the checkpointed assets are undone.
pub trait AssetCustody {
    /// Opaque saved state returned by [`checkpoint`](Self::checkpoint).
    type Checkpoint;

    /// Balance of `holder` in `asset`.
    fn balance_of(&self, asset: &AssetId, holder: AccountId) -> CustodyResult<Amount>;

    /// Amount `spender` may still pull from `owner`.
    fn allowance(
        &self,
        asset: &AssetId,
        owner: AccountId,
        spender: AccountId,
    ) -> CustodyResult<Amount>;

    /// Move `amount` from `from`'s own balance to `to`.
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> CustodyResult<()>;

    /// `spender` moves `amount` from `owner` to `to`, consuming allowance.
    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: AccountId,
        owner: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> CustodyResult<()>;

    /// Capture the current state of `assets`.
    fn checkpoint(&self, assets: &[&AssetId]) -> Self::Checkpoint;

    /// Restore a state captured by [`checkpoint`](Self::checkpoint).
    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}
