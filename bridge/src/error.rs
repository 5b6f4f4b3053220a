//! Settlement engine error types.

use remitbridge_common::{Address, Currency};
use remitbridge_ledger::LedgerError;
use thiserror::Error;

/// Errors surfaced by the settlement engine.
///
/// All errors are returned synchronously to the caller of the failing
/// operation; none are retried internally.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Zero or otherwise unusable quantity supplied.
    #[error("Invalid amount: must be positive")]
    InvalidAmount,

    /// Rejected exchange-rate update.
    #[error("Invalid rate: must be positive")]
    InvalidRate,

    /// Rejected fee-rate update.
    #[error("Fee rate {bps} bps exceeds maximum {max} bps")]
    FeeTooHigh { bps: u32, max: u32 },

    /// Administrative capability check failed.
    #[error("Caller is not authorized for administrative operations")]
    Unauthorized,

    /// The ledger adapter reported a mutation failure.
    #[error("Ledger operation failed: {0}")]
    TransferFailed(#[from] LedgerError),

    /// Query against an empty per-user cost history.
    #[error("No cost history for {0}")]
    NoHistory(Address),

    /// Fixed-point arithmetic left the representable range.
    #[error("Amount overflow")]
    AmountOverflow,

    /// Neither bridged leg matches the named currency.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(Currency),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for engine operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
