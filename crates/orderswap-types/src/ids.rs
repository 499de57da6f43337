//! Identifiers used throughout OrderSwap.
//!
//! Orders use a monotonically assigned `u64`; accounts use UUIDv7 so that
//! freshly provisioned accounts sort by creation time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Ledger-assigned order identifier. Strictly increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a party holding assets: a depositor, a fulfiller, or the
/// engine's own custody account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Trailing eight hex characters (the random part), for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0.as_bytes()[12..])
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Identifier of a fungible asset (e.g. `"WEB3"`, `"GUZ"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// AssetPair
// ---------------------------------------------------------------------------

/// Directed pair: what the depositor escrows, and what they want back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetPair {
    pub offered: AssetId,
    pub desired: AssetId,
}

impl AssetPair {
    #[must_use]
    pub fn new(offered: impl Into<AssetId>, desired: impl Into<AssetId>) -> Self {
        Self {
            offered: offered.into(),
            desired: desired.into(),
        }
    }

    /// The pair seen from the counterparty's side.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            offered: self.desired.clone(),
            desired: self.offered.clone(),
        }
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.offered, self.desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_next_is_monotonic() {
        let id = OrderId(7);
        assert_eq!(id.next(), OrderId(8));
        assert!(id < id.next());
    }

    #[test]
    fn account_id_uniqueness() {
        assert_ne!(AccountId::new(), AccountId::new());
    }

    #[test]
    fn account_short_is_eight_hex_chars() {
        let acct = AccountId::from_bytes([0xab; 16]);
        assert_eq!(acct.short(), "abababab");
    }

    #[test]
    fn asset_pair_display_and_inverse() {
        let pair = AssetPair::new("WEB3", "GUZ");
        assert_eq!(pair.to_string(), "WEB3->GUZ");
        assert_eq!(pair.inverse(), AssetPair::new("GUZ", "WEB3"));
    }

    #[test]
    fn asset_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AssetId::new("GUZ")).unwrap();
        assert_eq!(json, "\"GUZ\"");
    }
}
