//! The swap engine, the only component that moves funds.
//!
//! Every state-changing call takes `&mut self` and owns the custody handle
//! for its whole duration: no other call can interleave with it, and custody
//! has no path back into the engine while a transfer is in flight.
//!
//! Multi-leg operations run inside a custody checkpoint. If any leg fails,
//! custody is rolled back and the order is left exactly as it was.

use chrono::{DateTime, Utc};
use orderswap_custody::AssetCustody;
use orderswap_types::{
    AccountId, Amount, AssetId, EngineConfig, NewOrder, Order, OrderId, OrderRef, OrderStatus,
    Result, SwapError, SwapEvent,
};

use crate::{clock::Clock, escrow_book::EscrowBook, ledger::OrderLedger, receipts::ReceiptLog};

/// Escrow-based order swap engine over a custody backend `C`.
pub struct SwapEngine<C: AssetCustody> {
    /// The engine's own custody account; escrow is held here.
    account: AccountId,
    custody: C,
    ledger: OrderLedger,
    escrow: EscrowBook,
    receipts: ReceiptLog,
    clock: Box<dyn Clock>,
    config: EngineConfig,
}

impl<C: AssetCustody> SwapEngine<C> {
    /// Create an engine holding escrow under `account`.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` is invalid.
    pub fn new(
        account: AccountId,
        custody: C,
        clock: impl Clock + 'static,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            account,
            custody,
            ledger: OrderLedger::with_max_horizon(config.max_deadline_horizon_secs),
            escrow: EscrowBook::new(),
            receipts: ReceiptLog::new(config.receipt_capacity),
            clock: Box::new(clock),
            config,
        })
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Escrow `offered_amount` of `offered_asset` from the depositor and
    /// record a new OPEN order.
    ///
    /// The depositor must have approved the engine's account for at least
    /// `offered_amount` beforehand. If the pull fails nothing is recorded.
    ///
    /// # Errors
    /// - `InvalidAmount`, `InvalidDeadline`, `InvalidAssetPair` on bad input
    /// - `InvalidCounterparty` if the engine itself is the depositor
    /// - `TransferFailed` if custody rejects the pull
    pub fn create_order(&mut self, input: NewOrder) -> Result<OrderId> {
        let now = self.clock.now();
        if input.depositor == self.account {
            return Err(SwapError::InvalidCounterparty(input.depositor));
        }
        self.ledger.validate(&input, now)?;

        let order_id = self.ledger.next_id();
        let receipt = self.receipts.prepare(
            SwapEvent::OrderCreated {
                order_id,
                depositor: input.depositor,
                offered_asset: input.offered_asset.clone(),
                offered_amount: input.offered_amount,
                desired_asset: input.desired_asset.clone(),
                desired_amount: input.desired_amount,
                deadline: input.deadline,
            },
            now,
        )?;

        let checkpoint = self.custody.checkpoint(&[&input.offered_asset]);
        if let Err(e) = self.custody.transfer_from(
            &input.offered_asset,
            self.account,
            input.depositor,
            self.account,
            input.offered_amount,
        ) {
            tracing::warn!(
                depositor = %input.depositor.short(),
                asset = %input.offered_asset,
                amount = %input.offered_amount,
                error = %e,
                "Escrow pull rejected"
            );
            return Err(SwapError::transfer(&input.offered_asset, e));
        }

        let offered_asset = input.offered_asset.clone();
        let offered_amount = input.offered_amount;
        let created = match self.ledger.create(input, now) {
            Ok(id) => id,
            Err(e) => {
                self.custody.rollback(checkpoint);
                return Err(e);
            }
        };
        debug_assert_eq!(created, order_id);

        self.escrow.lock(&offered_asset, offered_amount);
        self.receipts.commit(receipt);

        tracing::info!(
            order_id = %order_id,
            asset = %offered_asset,
            amount = %offered_amount,
            "Order created"
        );
        Ok(order_id)
    }

    /// Fill an OPEN order: pull the desired asset from `fulfiller`, then pay
    /// out both legs.
    ///
    /// Asset-addressed references pick the earliest-created open order that
    /// is still within its deadline.
    ///
    /// # Errors
    /// - `OrderNotFound` / `NoOpenOrder` if nothing matches `order_ref`
    /// - `InvalidState` if the order is not OPEN
    /// - `Expired` if `now >= deadline`
    /// - `InvalidCounterparty` if `fulfiller` is the depositor or the engine
    /// - `TransferFailed` if any leg is rejected (all legs rolled back)
    pub fn fulfill_order(&mut self, fulfiller: AccountId, order_ref: OrderRef) -> Result<OrderId> {
        let now = self.clock.now();
        let order = self.ledger.resolve_live(&order_ref, now)?.clone();

        if !order.is_open() {
            return Err(SwapError::InvalidState {
                order_id: order.id,
                status: order.status,
            });
        }
        if order.is_past_deadline(now) {
            return Err(SwapError::Expired {
                order_id: order.id,
                deadline: order.deadline,
            });
        }
        if fulfiller == order.depositor || fulfiller == self.account {
            tracing::warn!(
                order_id = %order.id,
                account = %fulfiller.short(),
                "Self-trade blocked"
            );
            return Err(SwapError::InvalidCounterparty(fulfiller));
        }

        let receipt = self.receipts.prepare(
            SwapEvent::OrderFilled {
                order_id: order.id,
                depositor: order.depositor,
                fulfiller,
                offered_asset: order.offered_asset.clone(),
                offered_amount: order.offered_amount,
                desired_asset: order.desired_asset.clone(),
                desired_amount: order.desired_amount,
            },
            now,
        )?;

        let checkpoint = self
            .custody
            .checkpoint(&[&order.offered_asset, &order.desired_asset]);
        let settled = self.settle_legs(&order, fulfiller).and_then(|()| {
            self.close(&order, |ledger| {
                ledger.mark_filled(order.id, fulfiller, now).map(|_| ())
            })
        });
        if let Err(e) = settled {
            self.custody.rollback(checkpoint);
            tracing::warn!(order_id = %order.id, error = %e, "Fulfillment rolled back");
            return Err(e);
        }
        self.receipts.commit(receipt);

        tracing::info!(
            order_id = %order.id,
            fulfiller = %fulfiller.short(),
            offered = %order.offered_amount,
            desired = %order.desired_amount,
            "Order filled"
        );
        Ok(order.id)
    }

    /// Return the escrow of an OPEN order whose deadline has passed.
    ///
    /// Anyone may trigger expiry; the funds only ever go to the depositor.
    /// Asset-addressed references pick the earliest open order that is
    /// already past its deadline.
    ///
    /// # Errors
    /// - `OrderNotFound` / `NoOpenOrder` if nothing matches `order_ref`
    /// - `InvalidState` if the order is not OPEN
    /// - `NotExpired` if called before the deadline
    pub fn expire_order(&mut self, caller: AccountId, order_ref: OrderRef) -> Result<OrderId> {
        let now = self.clock.now();
        let order = self.ledger.resolve_due(&order_ref, now)?.clone();

        if !order.is_open() {
            return Err(SwapError::InvalidState {
                order_id: order.id,
                status: order.status,
            });
        }
        if !order.is_past_deadline(now) {
            return Err(SwapError::NotExpired {
                order_id: order.id,
                deadline: order.deadline,
            });
        }

        let event = SwapEvent::OrderExpired {
            order_id: order.id,
            depositor: order.depositor,
            triggered_by: caller,
            refunded: order.offered_amount,
        };
        self.refund(&order, OrderStatus::Expired, event, now)?;

        tracing::info!(
            order_id = %order.id,
            caller = %caller.short(),
            refunded = %order.offered_amount,
            "Order expired"
        );
        Ok(order.id)
    }

    /// Withdraw an OPEN order before it is filled; depositor only.
    ///
    /// Asset-addressed references pick `caller`'s earliest open order.
    ///
    /// # Errors
    /// - `CancellationDisabled` if the config forbids it
    /// - `OrderNotFound` / `NoOpenOrder` if nothing matches `order_ref`
    /// - `InvalidState` if the order is not OPEN
    /// - `Unauthorized` if `caller` is not the depositor
    pub fn cancel_order(&mut self, caller: AccountId, order_ref: OrderRef) -> Result<OrderId> {
        if !self.config.allow_cancellation {
            return Err(SwapError::CancellationDisabled);
        }
        let now = self.clock.now();
        let order = self.ledger.resolve_for_depositor(&order_ref, caller)?.clone();

        if !order.is_open() {
            return Err(SwapError::InvalidState {
                order_id: order.id,
                status: order.status,
            });
        }
        if caller != order.depositor {
            return Err(SwapError::Unauthorized {
                caller,
                order_id: order.id,
            });
        }

        let event = SwapEvent::OrderCancelled {
            order_id: order.id,
            depositor: order.depositor,
            refunded: order.offered_amount,
        };
        self.refund(&order, OrderStatus::Cancelled, event, now)?;

        tracing::info!(order_id = %order.id, refunded = %order.offered_amount, "Order cancelled");
        Ok(order.id)
    }

    /// Expire every OPEN order whose deadline has passed. Returns the ids
    /// expired, oldest first.
    pub fn expire_due_orders(&mut self, caller: AccountId) -> Result<Vec<OrderId>> {
        let due = self.ledger.due_for_expiry(self.clock.now());
        for id in &due {
            self.expire_order(caller, OrderRef::Id(*id))?;
        }
        if !due.is_empty() {
            tracing::debug!(count = due.len(), "Expiry sweep complete");
        }
        Ok(due)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Steps 3–5 of a fill. The pull is verified before either push runs.
    fn settle_legs(&mut self, order: &Order, fulfiller: AccountId) -> Result<()> {
        let desired = &order.desired_asset;
        let offered = &order.offered_asset;

        // 3. Pull the desired asset from the fulfiller
        let before = self.custodied(desired)?;
        self.custody
            .transfer_from(desired, self.account, fulfiller, self.account, order.desired_amount)
            .map_err(|e| SwapError::transfer(desired, e))?;
        let received = self.custodied(desired)? - before;
        if received != order.desired_amount {
            return Err(SwapError::EscrowInvariantViolation {
                reason: format!(
                    "pull for {} credited {received} {desired}, expected {}",
                    order.id, order.desired_amount
                ),
            });
        }
        tracing::debug!(order_id = %order.id, asset = %desired, amount = %received, "Counter-funds received");

        // 4. Offered asset to the fulfiller
        self.custody
            .transfer(offered, self.account, fulfiller, order.offered_amount)
            .map_err(|e| SwapError::transfer(offered, e))?;
        tracing::debug!(order_id = %order.id, asset = %offered, "Offered leg paid");

        // 5. Desired asset to the depositor
        self.custody
            .transfer(desired, self.account, order.depositor, order.desired_amount)
            .map_err(|e| SwapError::transfer(desired, e))?;
        tracing::debug!(order_id = %order.id, asset = %desired, "Desired leg paid");

        Ok(())
    }

    /// Return an order's escrow to its depositor and close it with `status`.
    fn refund(
        &mut self,
        order: &Order,
        status: OrderStatus,
        event: SwapEvent,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let receipt = self.receipts.prepare(event, now)?;
        let checkpoint = self.custody.checkpoint(&[&order.offered_asset]);

        let outcome = self
            .custody
            .transfer(
                &order.offered_asset,
                self.account,
                order.depositor,
                order.offered_amount,
            )
            .map_err(|e| SwapError::transfer(&order.offered_asset, e))
            .and_then(|()| {
                self.close(order, |ledger| match status {
                    OrderStatus::Expired => ledger.mark_expired(order.id, now).map(|_| ()),
                    OrderStatus::Cancelled => ledger.mark_cancelled(order.id, now).map(|_| ()),
                    other => Err(SwapError::Internal(format!(
                        "refund cannot close an order as {other}"
                    ))),
                })
            });

        if let Err(e) = outcome {
            self.custody.rollback(checkpoint);
            tracing::warn!(order_id = %order.id, error = %e, "Refund rolled back");
            return Err(e);
        }
        self.receipts.commit(receipt);
        Ok(())
    }

    /// Release `order`'s escrow, then apply the ledger `transition`. The
    /// release is reverted if the transition is refused, so a failure leaves
    /// both the book and the order as they were.
    fn close(
        &mut self,
        order: &Order,
        transition: impl FnOnce(&mut OrderLedger) -> Result<()>,
    ) -> Result<()> {
        self.escrow.release(&order.offered_asset, order.offered_amount)?;
        if let Err(e) = transition(&mut self.ledger) {
            self.escrow.lock(&order.offered_asset, order.offered_amount);
            return Err(e);
        }
        Ok(())
    }

    fn custodied(&self, asset: &AssetId) -> Result<Amount> {
        self.custody
            .balance_of(asset, self.account)
            .map_err(|e| SwapError::transfer(asset, e))
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn order(&self, id: OrderId) -> Result<&Order> {
        self.ledger.get(id)
    }

    /// Resolve a reference: `Id` in any status, asset references to the
    /// earliest open order.
    pub fn find(&self, order_ref: &OrderRef) -> Result<&Order> {
        self.ledger.resolve(order_ref)
    }

    /// OPEN orders, oldest first.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.ledger.open_orders()
    }

    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// What custody reports the engine holding in `asset`.
    pub fn escrowed_balance(&self, asset: &AssetId) -> Result<Amount> {
        self.custodied(asset)
    }

    /// Check custody balance == escrow book == open-order total for `asset`.
    pub fn verify_escrow(&self, asset: &AssetId) -> Result<()> {
        let custodied = self.custodied(asset)?;
        self.escrow
            .verify(asset, custodied, self.ledger.open_escrow_total(asset))
    }

    #[must_use]
    pub fn escrow_book(&self) -> &EscrowBook {
        &self.escrow
    }

    #[must_use]
    pub fn receipts(&self) -> &ReceiptLog {
        &self.receipts
    }

    #[must_use]
    pub fn account(&self) -> AccountId {
        self.account
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Owner-side custody actions: minting and approvals in tests and the
    /// simulator. Moving the engine's own balance through this handle
    /// breaks [`verify_escrow`](Self::verify_escrow).
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }
}
