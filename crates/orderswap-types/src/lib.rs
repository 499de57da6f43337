//! # orderswap-types
//!
//! Shared types, errors, and configuration for the **OrderSwap** escrow engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`AccountId`], [`AssetId`], [`AssetPair`]
//! - **Order model**: [`Order`], [`NewOrder`], [`OrderStatus`], [`OrderRef`]
//! - **Amounts**: [`Amount`] and base-unit helpers
//! - **Receipts**: [`SwapEvent`], [`SwapReceipt`]
//! - **Configuration**: [`EngineConfig`], [`AssetConfig`]
//! - **Errors**: [`SwapError`] with `OSW_ERR_` prefix codes, [`TransferError`]
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use orderswap_types::{Order, OrderStatus, SwapError, ...};

pub use amount::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use receipt::*;

// Constants are accessed via `orderswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
