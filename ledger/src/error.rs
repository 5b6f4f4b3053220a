//! Ledger adapter error types.

use remitbridge_common::Amount;
use thiserror::Error;

/// Errors reported by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Sender does not hold enough balance.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    /// Delegated spending allowance is too small.
    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: Amount, available: Amount },

    /// Balance arithmetic would overflow the fixed-point range.
    #[error("Amount overflow")]
    AmountOverflow,

    /// The ledger rejected the operation.
    #[error("Ledger rejected operation: {0}")]
    Rejected(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
