//! Order ledger: the durable record of every order.
//!
//! Orders are stored by [`OrderId`] for the lifetime of the ledger. Open
//! orders are additionally indexed per [`AssetPair`] in FIFO order (front =
//! oldest), so asset-addressed lookups deterministically select the
//! earliest-created open order.
//!
//! The ledger never moves funds; the engine calls it only to record state.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use orderswap_types::{
    constants, ensure_positive_whole, AccountId, Amount, AssetId, AssetPair, NewOrder, Order,
    OrderId, OrderRef, OrderStatus, Result, SwapError,
};
use rust_decimal::Decimal;

/// Storage and lookup for orders.
#[derive(Debug, Clone)]
pub struct OrderLedger {
    /// Every order ever created, in id (= creation) order.
    orders: BTreeMap<OrderId, Order>,
    /// Open orders per pair, oldest first.
    open_by_pair: HashMap<AssetPair, VecDeque<OrderId>>,
    /// Identifier the next `create` will assign.
    next_id: OrderId,
    /// Furthest a deadline may lie beyond "now".
    max_deadline_horizon: Option<chrono::Duration>,
}

impl OrderLedger {
    /// Create an empty ledger with no deadline horizon.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            open_by_pair: HashMap::new(),
            next_id: OrderId(constants::FIRST_ORDER_ID),
            max_deadline_horizon: None,
        }
    }

    /// Create a ledger that rejects deadlines more than `secs` ahead.
    #[must_use]
    pub fn with_max_horizon(secs: Option<u64>) -> Self {
        let mut ledger = Self::new();
        // Horizons too large for a Duration are treated as unbounded.
        ledger.max_deadline_horizon = secs
            .and_then(|s| i64::try_from(s).ok())
            .and_then(chrono::Duration::try_seconds);
        ledger
    }

    /// Check creation inputs without recording anything.
    ///
    /// # Errors
    /// - `InvalidAmount` if either amount is not a positive whole number
    /// - `InvalidAssetPair` if offered and desired asset coincide
    /// - `InvalidDeadline` if the deadline is not strictly after `now`, or
    ///   is beyond the configured horizon
    pub fn validate(&self, input: &NewOrder, now: DateTime<Utc>) -> Result<()> {
        ensure_positive_whole("offered_amount", input.offered_amount)?;
        ensure_positive_whole("desired_amount", input.desired_amount)?;

        if input.offered_asset == input.desired_asset {
            return Err(SwapError::InvalidAssetPair(input.offered_asset.clone()));
        }

        if input.deadline <= now {
            return Err(SwapError::InvalidDeadline {
                reason: format!("deadline {} is not after now {now}", input.deadline),
            });
        }
        if let Some(horizon) = self.max_deadline_horizon {
            if input.deadline - now > horizon {
                return Err(SwapError::InvalidDeadline {
                    reason: format!(
                        "deadline {} is more than {}s ahead",
                        input.deadline,
                        horizon.num_seconds()
                    ),
                });
            }
        }
        Ok(())
    }

    /// The id the next successful `create` will return.
    #[must_use]
    pub fn next_id(&self) -> OrderId {
        self.next_id
    }

    /// Record a new OPEN order and return its fresh identifier.
    pub fn create(&mut self, input: NewOrder, now: DateTime<Utc>) -> Result<OrderId> {
        self.validate(&input, now)?;

        let id = self.next_id;
        self.next_id = id.next();

        let order = Order {
            id,
            depositor: input.depositor,
            offered_asset: input.offered_asset,
            desired_asset: input.desired_asset,
            offered_amount: input.offered_amount,
            desired_amount: input.desired_amount,
            deadline: input.deadline,
            status: OrderStatus::Open,
            created_at: now,
            closed_at: None,
            fulfiller: None,
        };
        self.open_by_pair
            .entry(order.pair())
            .or_default()
            .push_back(id);
        self.orders.insert(id, order);
        Ok(id)
    }

    pub fn get(&self, id: OrderId) -> Result<&Order> {
        self.orders.get(&id).ok_or(SwapError::OrderNotFound(id))
    }

    /// Earliest-created OPEN order escrowing `offered` for `desired`.
    pub fn find_open_by_asset_pair(&self, offered: &AssetId, desired: &AssetId) -> Result<&Order> {
        let pair = AssetPair::new(offered.clone(), desired.clone());
        self.open_ids_for_pair(&pair)
            .next()
            .map(|id| &self.orders[&id])
            .ok_or_else(|| SwapError::NoOpenOrder {
                reference: OrderRef::Pair(pair).to_string(),
            })
    }

    /// Earliest-created OPEN order wanting `desired`, whatever it offers.
    pub fn find_open_by_desired_asset(&self, desired: &AssetId) -> Result<&Order> {
        self.open_by_pair
            .iter()
            .filter(|(pair, _)| pair.desired == *desired)
            .filter_map(|(_, queue)| queue.front().copied())
            .min()
            .map(|id| &self.orders[&id])
            .ok_or_else(|| SwapError::NoOpenOrder {
                reference: OrderRef::Paying(desired.clone()).to_string(),
            })
    }

    /// Resolve a reference. `Id` returns the order in any status; asset
    /// references only ever return OPEN orders.
    pub fn resolve(&self, order_ref: &OrderRef) -> Result<&Order> {
        match order_ref {
            OrderRef::Id(id) => self.get(*id),
            OrderRef::Pair(pair) => self.find_open_by_asset_pair(&pair.offered, &pair.desired),
            OrderRef::Paying(asset) => self.find_open_by_desired_asset(asset),
        }
    }

    /// Like [`resolve`](Self::resolve), but asset references skip open
    /// orders already past their deadline, so a stale order at the head of
    /// a queue does not shadow a live one behind it.
    ///
    /// If every matching open order is past its deadline, the earliest one
    /// is returned and the caller reports it as expired.
    pub fn resolve_live(&self, order_ref: &OrderRef, now: DateTime<Utc>) -> Result<&Order> {
        self.resolve_preferring(order_ref, |order| !order.is_past_deadline(now))
    }

    /// Asset references select the earliest open order already past its
    /// deadline. If none is due yet, the earliest open order is returned
    /// and the caller reports it as not expired.
    pub fn resolve_due(&self, order_ref: &OrderRef, now: DateTime<Utc>) -> Result<&Order> {
        self.resolve_preferring(order_ref, |order| order.is_past_deadline(now))
    }

    /// Asset references select `depositor`'s earliest open order. If they
    /// have none, the earliest open order is returned and the caller
    /// reports it as not theirs.
    pub fn resolve_for_depositor(
        &self,
        order_ref: &OrderRef,
        depositor: AccountId,
    ) -> Result<&Order> {
        self.resolve_preferring(order_ref, |order| order.depositor == depositor)
    }

    /// First open order matched by `order_ref` that satisfies `prefer`,
    /// else the earliest one matched. `Id` references bypass the preference.
    fn resolve_preferring(
        &self,
        order_ref: &OrderRef,
        prefer: impl Fn(&Order) -> bool,
    ) -> Result<&Order> {
        let candidates: Vec<OrderId> = match order_ref {
            OrderRef::Id(_) => return self.resolve(order_ref),
            OrderRef::Pair(pair) => self.open_ids_for_pair(pair).collect(),
            OrderRef::Paying(asset) => {
                let mut ids: Vec<OrderId> = self
                    .open_by_pair
                    .iter()
                    .filter(|(pair, _)| pair.desired == *asset)
                    .flat_map(|(_, queue)| queue.iter().copied())
                    .collect();
                ids.sort_unstable();
                ids
            }
        };

        candidates
            .iter()
            .map(|id| &self.orders[id])
            .find(|order| prefer(order))
            .or_else(|| candidates.first().map(|id| &self.orders[id]))
            .ok_or_else(|| SwapError::NoOpenOrder {
                reference: order_ref.to_string(),
            })
    }

    /// OPEN → FILLED, recording who filled it.
    pub fn mark_filled(
        &mut self,
        id: OrderId,
        fulfiller: AccountId,
        at: DateTime<Utc>,
    ) -> Result<&Order> {
        self.transition(id, OrderStatus::Filled, at)?;
        let order = self.orders.get_mut(&id).ok_or(SwapError::OrderNotFound(id))?;
        order.fulfiller = Some(fulfiller);
        Ok(order)
    }

    /// OPEN → EXPIRED.
    pub fn mark_expired(&mut self, id: OrderId, at: DateTime<Utc>) -> Result<&Order> {
        self.transition(id, OrderStatus::Expired, at)
    }

    /// OPEN → CANCELLED.
    pub fn mark_cancelled(&mut self, id: OrderId, at: DateTime<Utc>) -> Result<&Order> {
        self.transition(id, OrderStatus::Cancelled, at)
    }

    fn transition(&mut self, id: OrderId, target: OrderStatus, at: DateTime<Utc>) -> Result<&Order> {
        let order = self.orders.get_mut(&id).ok_or(SwapError::OrderNotFound(id))?;
        if !order.status.can_transition_to(target) {
            return Err(SwapError::InvalidState {
                order_id: id,
                status: order.status,
            });
        }
        order.status = target;
        order.closed_at = Some(at);

        let pair = order.pair();
        if let Some(queue) = self.open_by_pair.get_mut(&pair) {
            if let Some(pos) = queue.iter().position(|open| *open == id) {
                queue.remove(pos);
            }
            if queue.is_empty() {
                self.open_by_pair.remove(&pair);
            }
        }
        Ok(&self.orders[&id])
    }

    fn open_ids_for_pair<'a>(&'a self, pair: &AssetPair) -> impl Iterator<Item = OrderId> + 'a {
        self.open_by_pair
            .get(pair)
            .into_iter()
            .flat_map(|queue| queue.iter().copied())
    }

    /// All OPEN orders, oldest first.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(|o| o.is_open())
    }

    /// Ids of OPEN orders whose deadline has passed at `now`.
    #[must_use]
    pub fn due_for_expiry(&self, now: DateTime<Utc>) -> Vec<OrderId> {
        self.open_orders()
            .filter(|o| o.is_past_deadline(now))
            .map(|o| o.id)
            .collect()
    }

    /// Σ `offered_amount` over OPEN orders escrowing `asset`.
    #[must_use]
    pub fn open_escrow_total(&self, asset: &AssetId) -> Amount {
        self.open_orders()
            .filter(|o| o.offered_asset == *asset)
            .map(|o| o.offered_amount)
            .fold(Decimal::ZERO, |acc, amt| acc + amt)
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.open_by_pair.values().map(VecDeque::len).sum()
    }

    /// Total orders ever recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for OrderLedger {
    fn default() -> Self {
        Self::new()
    }
}
