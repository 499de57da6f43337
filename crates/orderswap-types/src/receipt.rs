//! Receipt types for the OrderSwap audit trail.
//!
//! Every order lifecycle transition produces a [`SwapReceipt`]. Receipts
//! are hash-chained: each one commits to its predecessor's hash, so a
//! retained run of receipts can be verified end to end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{constants, AccountId, Amount, AssetId, OrderId};

/// A lifecycle event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapEvent {
    OrderCreated {
        order_id: OrderId,
        depositor: AccountId,
        offered_asset: AssetId,
        offered_amount: Amount,
        desired_asset: AssetId,
        desired_amount: Amount,
        deadline: DateTime<Utc>,
    },
    OrderFilled {
        order_id: OrderId,
        depositor: AccountId,
        fulfiller: AccountId,
        offered_asset: AssetId,
        offered_amount: Amount,
        desired_asset: AssetId,
        desired_amount: Amount,
    },
    OrderExpired {
        order_id: OrderId,
        depositor: AccountId,
        /// Whoever triggered the expiry; not necessarily the depositor.
        triggered_by: AccountId,
        refunded: Amount,
    },
    OrderCancelled {
        order_id: OrderId,
        depositor: AccountId,
        refunded: Amount,
    },
}

impl SwapEvent {
    #[must_use]
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::OrderCreated { order_id, .. }
            | Self::OrderFilled { order_id, .. }
            | Self::OrderExpired { order_id, .. }
            | Self::OrderCancelled { order_id, .. } => *order_id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "ORDER_CREATED",
            Self::OrderFilled { .. } => "ORDER_FILLED",
            Self::OrderExpired { .. } => "ORDER_EXPIRED",
            Self::OrderCancelled { .. } => "ORDER_CANCELLED",
        }
    }
}

/// One entry of the hash-chained audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    pub event: SwapEvent,
    /// Hash of the previous receipt, all zeros for the first.
    pub prev_hash: [u8; 32],
    /// `SHA-256(domain || sequence || prev_hash || json(event))`.
    pub hash: [u8; 32],
    pub issued_at: DateTime<Utc>,
}

impl SwapReceipt {
    /// Build a receipt chained onto `prev_hash`.
    pub fn new(
        sequence: u64,
        event: SwapEvent,
        prev_hash: [u8; 32],
        issued_at: DateTime<Utc>,
    ) -> crate::Result<Self> {
        let hash = Self::compute_hash(sequence, &prev_hash, &event)?;
        Ok(Self {
            sequence,
            event,
            prev_hash,
            hash,
            issued_at,
        })
    }

    fn compute_hash(
        sequence: u64,
        prev_hash: &[u8; 32],
        event: &SwapEvent,
    ) -> crate::Result<[u8; 32]> {
        let payload = serde_json::to_vec(event)?;
        let mut hasher = Sha256::new();
        hasher.update(constants::RECEIPT_DOMAIN);
        hasher.update(sequence.to_le_bytes());
        hasher.update(prev_hash);
        hasher.update(&payload);
        Ok(hasher.finalize().into())
    }

    /// Recompute the hash and compare with the stored one.
    #[must_use]
    pub fn verify(&self) -> bool {
        Self::compute_hash(self.sequence, &self.prev_hash, &self.event)
            .is_ok_and(|h| h == self.hash)
    }

    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}
