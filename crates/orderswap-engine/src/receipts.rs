//! Bounded, hash-chained receipt log.
//!
//! Receipts are built with [`ReceiptLog::prepare`] *before* the engine
//! mutates any state, and appended with [`ReceiptLog::commit`] once the
//! transition has succeeded, so a lifecycle change is never left without
//! its receipt.
//!
//! When the log reaches capacity, the oldest receipt is evicted. The chain
//! head survives eviction, so new receipts keep linking correctly.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use orderswap_types::{OrderId, Result, SwapEvent, SwapReceipt};

/// Append-only audit trail with FIFO eviction.
#[derive(Debug, Clone)]
pub struct ReceiptLog {
    /// Retained receipts, oldest at the front.
    receipts: VecDeque<SwapReceipt>,
    capacity: usize,
    next_sequence: u64,
    /// Hash of the last committed receipt.
    head: [u8; 32],
}

impl ReceiptLog {
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ReceiptLog capacity must be > 0");
        Self {
            receipts: VecDeque::new(),
            capacity,
            next_sequence: 0,
            head: [0u8; 32],
        }
    }

    /// Build the next receipt without appending it.
    pub fn prepare(&self, event: SwapEvent, at: DateTime<Utc>) -> Result<SwapReceipt> {
        SwapReceipt::new(self.next_sequence, event, self.head, at)
    }

    /// Append a receipt produced by [`prepare`](Self::prepare) on this log.
    pub fn commit(&mut self, receipt: SwapReceipt) {
        debug_assert_eq!(receipt.sequence, self.next_sequence);
        debug_assert_eq!(receipt.prev_hash, self.head);

        if self.receipts.len() >= self.capacity {
            self.receipts.pop_front();
        }
        self.head = receipt.hash;
        self.next_sequence = receipt.sequence + 1;
        self.receipts.push_back(receipt);
    }

    /// Hash of the most recent receipt (all zeros before the first).
    #[must_use]
    pub fn head_hash(&self) -> [u8; 32] {
        self.head
    }

    #[must_use]
    pub fn latest(&self) -> Option<&SwapReceipt> {
        self.receipts.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SwapReceipt> {
        self.receipts.iter()
    }

    /// Retained receipts concerning `order_id`, oldest first.
    #[must_use]
    pub fn for_order(&self, order_id: OrderId) -> Vec<&SwapReceipt> {
        self.receipts
            .iter()
            .filter(|r| r.event.order_id() == order_id)
            .collect()
    }

    /// Every retained receipt hashes correctly and links to its predecessor.
    #[must_use]
    pub fn verify_chain(&self) -> bool {
        let mut prev: Option<&SwapReceipt> = None;
        for receipt in &self.receipts {
            if !receipt.verify() {
                return false;
            }
            if let Some(p) = prev {
                if receipt.prev_hash != p.hash || receipt.sequence != p.sequence + 1 {
                    return false;
                }
            }
            prev = Some(receipt);
        }
        prev.is_none_or(|last| last.hash == self.head)
    }

    /// Number of retained receipts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    /// Receipts ever committed, including evicted ones.
    #[must_use]
    pub fn total_committed(&self) -> u64 {
        self.next_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderswap_types::AccountId;
    use rust_decimal::Decimal;

    fn event(id: u64) -> SwapEvent {
        SwapEvent::OrderCancelled {
            order_id: OrderId(id),
            depositor: AccountId::from_bytes([7; 16]),
            refunded: Decimal::ONE,
        }
    }

    fn append(log: &mut ReceiptLog, id: u64) {
        let r = log.prepare(event(id), Utc::now()).unwrap();
        log.commit(r);
    }

    #[test]
    fn empty_log() {
        let log = ReceiptLog::new(4);
        assert!(log.is_empty());
        assert_eq!(log.head_hash(), [0u8; 32]);
        assert!(log.verify_chain());
    }

    #[test]
    fn commits_chain_together() {
        let mut log = ReceiptLog::new(8);
        append(&mut log, 1);
        append(&mut log, 2);
        append(&mut log, 1);

        assert_eq!(log.len(), 3);
        assert!(log.verify_chain());
        let receipts: Vec<_> = log.iter().collect();
        assert_eq!(receipts[1].prev_hash, receipts[0].hash);
        assert_eq!(log.head_hash(), receipts[2].hash);
        assert_eq!(log.for_order(OrderId(1)).len(), 2);
    }

    #[test]
    fn prepared_but_uncommitted_leaves_log_unchanged() {
        let mut log = ReceiptLog::new(8);
        append(&mut log, 1);
        let head = log.head_hash();
        let _discarded = log.prepare(event(2), Utc::now()).unwrap();
        assert_eq!(log.head_hash(), head);
        assert_eq!(log.total_committed(), 1);
    }

    #[test]
    fn evicts_oldest_but_keeps_chaining() {
        let mut log = ReceiptLog::new(2);
        for id in 1..=5 {
            append(&mut log, id);
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.total_committed(), 5);
        assert_eq!(log.iter().next().unwrap().sequence, 3);
        assert!(log.verify_chain());
    }

    #[test]
    fn tampering_breaks_chain() {
        let mut log = ReceiptLog::new(4);
        append(&mut log, 1);
        append(&mut log, 2);
        log.receipts[0].event = event(9);
        assert!(!log.verify_chain());
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = ReceiptLog::new(0);
    }
}
