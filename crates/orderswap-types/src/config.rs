//! Configuration types for the swap engine and its assets.

use serde::{Deserialize, Serialize};

use crate::{constants, AssetId, Result, SwapError};

/// Engine-wide policy knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether depositors may withdraw an open order before its deadline.
    pub allow_cancellation: bool,
    /// Reject deadlines further than this many seconds ahead. `None` = unbounded.
    pub max_deadline_horizon_secs: Option<u64>,
    /// Number of receipts retained in memory.
    pub receipt_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_cancellation: true,
            max_deadline_horizon_secs: Some(constants::DEFAULT_MAX_DEADLINE_HORIZON_SECS),
            receipt_capacity: constants::DEFAULT_RECEIPT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| SwapError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.receipt_capacity == 0 {
            return Err(SwapError::Configuration(
                "receipt_capacity must be > 0".to_string(),
            ));
        }
        if self.max_deadline_horizon_secs == Some(0) {
            return Err(SwapError::Configuration(
                "max_deadline_horizon_secs must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-asset configuration for a custody registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub id: AssetId,
    /// Decimal places between the human unit and the base unit.
    pub decimals: u32,
}

impl AssetConfig {
    #[must_use]
    pub fn new(id: impl Into<AssetId>, decimals: u32) -> Self {
        Self {
            id: id.into(),
            decimals,
        }
    }

    /// An 18-decimal asset, the usual ERC-20 precision.
    #[must_use]
    pub fn standard(id: impl Into<AssetId>) -> Self {
        Self::new(id, constants::DEFAULT_ASSET_DECIMALS)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(SwapError::Configuration("asset id is empty".to_string()));
        }
        if self.decimals > constants::MAX_ASSET_DECIMALS {
            return Err(SwapError::Configuration(format!(
                "asset {} declares {} decimals, max is {}",
                self.id,
                self.decimals,
                constants::MAX_ASSET_DECIMALS
            )));
        }
        Ok(())
    }
}
