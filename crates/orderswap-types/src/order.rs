//! Order types for the OrderSwap engine.
//!
//! An order is a depositor's standing offer: a fixed amount of one asset,
//! already held in escrow, in exchange for a fixed amount of another asset,
//! valid until a deadline.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐  fulfill    ┌────────┐
//!   │ OPEN ├────────────▶│ FILLED │
//!   └─┬──┬─┘             └────────┘
//!     │  │ deadline passed
//!     │  └──────────────▶┌─────────┐
//!     │                  │ EXPIRED │
//!     │ depositor cancel └─────────┘
//!     ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, AssetPair, OrderId};

/// Lifecycle status of an order.
///
/// Transitions are **monotonic**: only `Open` may move, and only to one of
/// the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Escrow held; the order can be fulfilled.
    Open,
    /// A counterparty supplied the desired asset; both legs settled.
    Filled,
    /// Deadline passed; escrow returned to the depositor.
    Expired,
    /// Withdrawn by the depositor; escrow returned.
    Cancelled,
}

impl OrderStatus {
    /// Can an order in this status move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Filled | Self::Expired | Self::Cancelled)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Filled => write!(f, "FILLED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Caller-supplied parameters for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub depositor: AccountId,
    pub offered_asset: AssetId,
    pub desired_asset: AssetId,
    pub offered_amount: Amount,
    pub desired_amount: Amount,
    pub deadline: DateTime<Utc>,
}

/// A recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Created the order; receives `desired_amount` on fulfillment.
    pub depositor: AccountId,
    pub offered_asset: AssetId,
    pub desired_asset: AssetId,
    /// Held in engine custody while the order is open.
    pub offered_amount: Amount,
    pub desired_amount: Amount,
    /// Fulfillment is rejected at or after this instant.
    pub deadline: DateTime<Utc>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// When the order left `Open`.
    pub closed_at: Option<DateTime<Utc>>,
    /// Set only by a successful fulfillment.
    pub fulfiller: Option<AccountId>,
}

impl Order {
    #[must_use]
    pub fn pair(&self) -> AssetPair {
        AssetPair::new(self.offered_asset.clone(), self.desired_asset.clone())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// An order is past its deadline once `now >= deadline`.
    #[must_use]
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Open and still within its deadline.
    #[must_use]
    pub fn is_fulfillable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && !self.is_past_deadline(now)
    }
}

/// How a caller addresses an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderRef {
    /// A specific order.
    Id(OrderId),
    /// The earliest open order escrowing `offered` and wanting `desired`.
    Pair(AssetPair),
    /// The earliest open order wanting this asset; the fulfiller names only
    /// the asset they pay with.
    Paying(AssetId),
}

impl From<OrderId> for OrderRef {
    fn from(id: OrderId) -> Self {
        Self::Id(id)
    }
}

impl From<AssetPair> for OrderRef {
    fn from(pair: AssetPair) -> Self {
        Self::Pair(pair)
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Pair(pair) => write!(f, "pair {pair}"),
            Self::Paying(asset) => write!(f, "orders wanting {asset}"),
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl NewOrder {
    /// 100 WEB3 for 20 GUZ, due one hour from `now`.
    pub fn dummy(depositor: AccountId, now: DateTime<Utc>) -> Self {
        Self {
            depositor,
            offered_asset: AssetId::new("WEB3"),
            desired_asset: AssetId::new("GUZ"),
            offered_amount: rust_decimal::Decimal::new(100, 0),
            desired_amount: rust_decimal::Decimal::new(20, 0),
            deadline: now + chrono::Duration::hours(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_order(now: DateTime<Utc>) -> Order {
        let input = NewOrder::dummy(AccountId::new(), now);
        Order {
            id: OrderId(1),
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
        }
    }

    #[test]
    fn transitions_only_leave_open() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Filled));
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Expired));
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Open));
        for terminal in [
            OrderStatus::Filled,
            OrderStatus::Expired,
            OrderStatus::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(OrderStatus::Filled));
            assert!(!terminal.can_transition_to(OrderStatus::Open));
        }
    }

    #[test]
    fn deadline_boundary_is_exclusive() {
        let now = Utc::now();
        let order = open_order(now);
        assert!(order.is_fulfillable_at(now));
        assert!(order.is_fulfillable_at(order.deadline - chrono::Duration::seconds(1)));
        assert!(!order.is_fulfillable_at(order.deadline));
        assert!(order.is_past_deadline(order.deadline));
    }

    #[test]
    fn order_ref_display() {
        assert_eq!(OrderRef::Id(OrderId(4)).to_string(), "order:4");
        assert_eq!(
            OrderRef::Pair(AssetPair::new("WEB3", "GUZ")).to_string(),
            "pair WEB3->GUZ"
        );
        assert_eq!(
            OrderRef::Paying(AssetId::new("GUZ")).to_string(),
            "orders wanting GUZ"
        );
    }

    #[test]
    fn order_serde_roundtrip() {
        let order = open_order(Utc::now());
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
