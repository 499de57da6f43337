//! System-wide constants for the OrderSwap engine.

/// Default token precision (decimal places), as used by ERC-20 style assets.
pub const DEFAULT_ASSET_DECIMALS: u32 = 18;

/// Largest precision an asset may declare.
///
/// `rust_decimal` carries 28 significant digits; 18 decimals still leave
/// room for ten whole digits.
pub const MAX_ASSET_DECIMALS: u32 = 18;

/// Default number of receipts retained by the receipt log.
pub const DEFAULT_RECEIPT_CAPACITY: usize = 100_000;

/// Default maximum distance between "now" and an order deadline (30 days).
pub const DEFAULT_MAX_DEADLINE_HORIZON_SECS: u64 = 30 * 24 * 60 * 60;

/// First identifier handed out by a fresh order ledger.
pub const FIRST_ORDER_ID: u64 = 1;

/// Domain separator for receipt hashes.
pub const RECEIPT_DOMAIN: &[u8] = b"orderswap:receipt:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OrderSwap";
