//! # orderswap-engine
//!
//! **Swap Engine**: custodies a depositor's offered asset, matches a
//! counterparty's fulfillment against the open order, and settles both legs
//! atomically.
//!
//! ## Architecture
//!
//! 1. **OrderLedger**: every order, keyed by [`OrderId`](orderswap_types::OrderId),
//!    with a FIFO index of open orders per asset pair
//! 2. **SwapEngine**: the only component that moves funds; owns the custody
//!    handle, the ledger, the escrow book, and the receipt log
//! 3. **EscrowBook**: running per-asset totals of what the engine holds in escrow
//! 4. **ReceiptLog**: hash-chained audit trail of lifecycle events
//! 5. **SharedSwapEngine**: mutex-guarded handle for multi-threaded callers
//!
//! ## Fulfillment Flow
//!
//! ```text
//! resolve order → check OPEN, deadline, counterparty → checkpoint custody
//!     → pull desired (fulfiller → engine) → push offered (engine → fulfiller)
//!     → push desired (engine → depositor) → mark FILLED
//!     (any leg fails → rollback to checkpoint, order stays OPEN)
//! ```

pub mod clock;
pub mod engine;
pub mod escrow_book;
pub mod ledger;
pub mod receipts;
pub mod shared;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::SwapEngine;
pub use escrow_book::EscrowBook;
pub use ledger::OrderLedger;
pub use receipts::ReceiptLog;
pub use shared::SharedSwapEngine;
