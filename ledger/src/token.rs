//! The ledger adapter contract consumed by the settlement engine.

use async_trait::async_trait;
use remitbridge_common::{Address, Amount, Currency};

use crate::error::LedgerResult;

/// Balance, transfer, and mint operations over a single token.
///
/// The engine consumes two independent instances, one per currency. A single
/// call is atomic from the adapter's point of view; atomicity across several
/// calls is the caller's responsibility.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Currency this ledger keeps balances in.
    fn currency(&self) -> &Currency;

    /// Current balance of an address. Unknown addresses hold zero.
    async fn balance_of(&self, address: &Address) -> LedgerResult<Amount>;

    /// Move `amount` from `from` to `to`.
    async fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// that much of the allowance `from` granted to `spender`.
    ///
    /// The allowance is checked before the balance and decremented only
    /// when the whole operation succeeds.
    async fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()>;

    /// Create `amount` new tokens on `address`.
    async fn mint_to(&self, address: &Address, amount: Amount) -> LedgerResult<()>;

    /// Destroy `amount` tokens held by `address`.
    async fn burn_from(&self, address: &Address, amount: Amount) -> LedgerResult<()>;

    /// Authorize `spender` to move up to `amount` on behalf of `owner`.
    async fn approve(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<()>;

    /// Remaining delegated allowance from `owner` to `spender`.
    async fn allowance(&self, owner: &Address, spender: &Address) -> LedgerResult<Amount>;
}
