//! Error types for the OrderSwap engine.
//!
//! All engine errors use the `OSW_ERR_` prefix convention for easy grepping
//! in logs. Error codes are grouped by subsystem:
//! - 1xx: Order validation and lifecycle errors
//! - 2xx: Custody (fund movement) errors
//! - 3xx: Escrow accounting errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, AssetId, OrderId, OrderStatus};

/// Failure reported by the asset-custody collaborator.
///
/// A transfer that fails never partially applies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    #[error("insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: Decimal, approved: Decimal },

    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),

    #[error("asset {0} is already registered")]
    DuplicateAsset(AssetId),

    #[error("invalid transfer amount {0}")]
    InvalidAmount(Decimal),

    #[error("supply overflow for {0}")]
    SupplyOverflow(AssetId),

    #[error("supply invariant violated: {reason}")]
    SupplyInvariantViolation { reason: String },
}

/// Central error enum for all engine operations.
#[derive(Debug, Error)]
pub enum SwapError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// An amount was zero, negative, or not a whole number of base units.
    #[error("OSW_ERR_100: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The deadline is not strictly in the future, or too far out.
    #[error("OSW_ERR_101: Invalid deadline: {reason}")]
    InvalidDeadline { reason: String },

    /// Offered and desired asset are the same.
    #[error("OSW_ERR_102: Offered and desired asset are both {0}")]
    InvalidAssetPair(AssetId),

    /// The order is not in the lifecycle stage the operation needs.
    #[error("OSW_ERR_103: Order {order_id} is {status}")]
    InvalidState {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// No order with this identifier exists.
    #[error("OSW_ERR_104: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// No Open order matches the asset-based reference.
    #[error("OSW_ERR_105: No open order for {reference}")]
    NoOpenOrder { reference: String },

    /// The order's deadline has passed; it can no longer be fulfilled.
    #[error("OSW_ERR_106: Order {order_id} expired at {deadline}")]
    Expired {
        order_id: OrderId,
        deadline: chrono::DateTime<chrono::Utc>,
    },

    /// Expiry was requested before the deadline.
    #[error("OSW_ERR_107: Order {order_id} does not expire until {deadline}")]
    NotExpired {
        order_id: OrderId,
        deadline: chrono::DateTime<chrono::Utc>,
    },

    /// The counterparty is not allowed to take this side (self-trade).
    #[error("OSW_ERR_108: Invalid counterparty {0}")]
    InvalidCounterparty(AccountId),

    /// The caller may not perform this operation on the order.
    #[error("OSW_ERR_109: {caller} is not authorized to act on {order_id}")]
    Unauthorized { caller: AccountId, order_id: OrderId },

    /// Voluntary cancellation is switched off in the engine config.
    #[error("OSW_ERR_110: Cancellation is disabled")]
    CancellationDisabled,

    // =================================================================
    // Custody Errors (2xx)
    // =================================================================
    /// The custody collaborator rejected a pull or push.
    #[error("OSW_ERR_200: Transfer of {asset} failed: {source}")]
    TransferFailed {
        asset: AssetId,
        #[source]
        source: TransferError,
    },

    // =================================================================
    // Escrow Errors (3xx)
    // =================================================================
    /// Custodied balance no longer matches the open escrow. Critical alert.
    #[error("OSW_ERR_300: Escrow invariant violation: {reason}")]
    EscrowInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OSW_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("OSW_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, out-of-range values, etc.).
    #[error("OSW_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl SwapError {
    /// Wrap a custody failure for `asset`.
    #[must_use]
    pub fn transfer(asset: &AssetId, source: TransferError) -> Self {
        Self::TransferFailed {
            asset: asset.clone(),
            source,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapError>;

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = SwapError::OrderNotFound(OrderId(3));
        let msg = format!("{err}");
        assert!(msg.starts_with("OSW_ERR_104"), "Got: {msg}");
        assert!(msg.contains("order:3"));
    }

    #[test]
    fn transfer_failed_carries_source() {
        let err = SwapError::transfer(
            &AssetId::new("GUZ"),
            TransferError::InsufficientAllowance {
                needed: Decimal::new(20, 0),
                approved: Decimal::ZERO,
            },
        );
        let msg = format!("{err}");
        assert!(msg.contains("OSW_ERR_200"));
        assert!(msg.contains("GUZ"));
        assert!(msg.contains("allowance"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_state_names_status() {
        let err = SwapError::InvalidState {
            order_id: OrderId(1),
            status: OrderStatus::Filled,
        };
        assert!(format!("{err}").contains("FILLED"));
    }

    #[test]
    fn all_errors_have_osw_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SwapError::CancellationDisabled),
            Box::new(SwapError::InvalidCounterparty(AccountId::new())),
            Box::new(SwapError::Internal("test".into())),
            Box::new(SwapError::NoOpenOrder {
                reference: "GUZ".into(),
            }),
            Box::new(SwapError::EscrowInvariantViolation {
                reason: "x".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OSW_ERR_"),
                "Error missing OSW_ERR_ prefix: {msg}"
            );
        }
    }
}
