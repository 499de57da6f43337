//! # orderswap-custody
//!
//! **Asset custody collaborator**: holds fungible balances and moves them
//! on behalf of the swap engine.
//!
//! ## Architecture
//!
//! 1. **AssetCustody**: the trait the engine depends on: `balance_of`,
//!    `allowance`, `transfer`, `transfer_from`, plus `checkpoint`/`rollback`
//! 2. **TokenLedger**: one fungible asset with balances and allowances
//! 3. **AssetRegistry**: many `TokenLedger`s behind one `AssetCustody` impl
//! 4. **SupplyConservation**: Σbalances == Σminted, per asset
//!
//! ## Pull Flow
//!
//! ```text
//! owner.approve(engine, n) → engine.transfer_from(owner → engine, n)
//!     → allowance -= n, owner -= n, engine += n
//! ```
//!
//! Transfers never partially apply: every check runs before any balance moves.

pub mod custody;
pub mod registry;
pub mod supply_conservation;
pub mod token;

pub use custody::{AssetCustody, CustodyResult};
pub use registry::{AssetRegistry, RegistryCheckpoint};
pub use supply_conservation::SupplyConservation;
pub use token::TokenLedger;
