//! Thread-safe handle over a [`SwapEngine`].
//!
//! Every operation takes the engine lock for its whole duration, so
//! concurrent callers are serialized one at a time. Two fulfillments racing
//! for the same order see exactly one winner; the loser gets `InvalidState`.

use std::sync::Arc;

use orderswap_custody::AssetCustody;
use orderswap_types::{AccountId, Amount, AssetId, NewOrder, Order, OrderId, OrderRef, Result};
use parking_lot::Mutex;

use crate::engine::SwapEngine;

/// Cloneable, mutex-guarded engine.
pub struct SharedSwapEngine<C: AssetCustody> {
    inner: Arc<Mutex<SwapEngine<C>>>,
}

impl<C: AssetCustody> Clone for SharedSwapEngine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: AssetCustody> SharedSwapEngine<C> {
    #[must_use]
    pub fn new(engine: SwapEngine<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn create_order(&self, input: NewOrder) -> Result<OrderId> {
        self.inner.lock().create_order(input)
    }

    pub fn fulfill_order(&self, fulfiller: AccountId, order_ref: OrderRef) -> Result<OrderId> {
        self.inner.lock().fulfill_order(fulfiller, order_ref)
    }

    pub fn expire_order(&self, caller: AccountId, order_ref: OrderRef) -> Result<OrderId> {
        self.inner.lock().expire_order(caller, order_ref)
    }

    pub fn cancel_order(&self, caller: AccountId, order_ref: OrderRef) -> Result<OrderId> {
        self.inner.lock().cancel_order(caller, order_ref)
    }

    pub fn expire_due_orders(&self, caller: AccountId) -> Result<Vec<OrderId>> {
        self.inner.lock().expire_due_orders(caller)
    }

    /// Snapshot of an order.
    pub fn order(&self, id: OrderId) -> Result<Order> {
        self.inner.lock().order(id).cloned()
    }

    pub fn escrowed_balance(&self, asset: &AssetId) -> Result<Amount> {
        self.inner.lock().escrowed_balance(asset)
    }

    pub fn verify_escrow(&self, asset: &AssetId) -> Result<()> {
        self.inner.lock().verify_escrow(asset)
    }

    /// Run `f` with shared access while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&SwapEngine<C>) -> R) -> R {
        f(&*self.inner.lock())
    }

    /// Run `f` with exclusive access while holding the lock.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut SwapEngine<C>) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}
