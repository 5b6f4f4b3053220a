//! RemitBridge Currency Ledger Adapter
//!
//! The narrow balance/transfer/mint contract the settlement engine consumes,
//! one instance per bridged currency, plus an in-memory implementation for
//! tests and the faucet-mode environment.

pub mod error;
pub mod memory;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod faults;

pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;
pub use token::TokenLedger;

#[cfg(any(test, feature = "test-utils"))]
pub use faults::FlakyLedger;
