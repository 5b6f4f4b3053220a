//! Fault-injecting ledger wrapper for exercising rollback paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use remitbridge_common::{Address, Amount, Currency};

use crate::error::{LedgerError, LedgerResult};
use crate::token::TokenLedger;

/// Wraps another ledger and fails exactly one upcoming operation on demand.
///
/// The failure switches are one-shot: the next matching call is rejected
/// before it reaches the inner ledger, and subsequent calls pass through.
pub struct FlakyLedger {
    inner: Arc<dyn TokenLedger>,
    fail_next_transfer: AtomicBool,
    fail_next_mint: AtomicBool,
}

impl FlakyLedger {
    /// Wrap an inner ledger.
    pub fn new(inner: Arc<dyn TokenLedger>) -> Self {
        Self {
            inner,
            fail_next_transfer: AtomicBool::new(false),
            fail_next_mint: AtomicBool::new(false),
        }
    }

    /// Fail the next `transfer` or `transfer_from` call.
    pub fn fail_next_transfer(&self) {
        self.fail_next_transfer.store(true, Ordering::SeqCst);
    }

    /// Fail the next `mint_to` call.
    pub fn fail_next_mint(&self) {
        self.fail_next_mint.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TokenLedger for FlakyLedger {
    fn currency(&self) -> &Currency {
        self.inner.currency()
    }

    async fn balance_of(&self, address: &Address) -> LedgerResult<Amount> {
        self.inner.balance_of(address).await
    }

    async fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        if self.fail_next_transfer.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::Rejected("injected transfer failure".into()));
        }
        self.inner.transfer(from, to, amount).await
    }

    async fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        if self.fail_next_transfer.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::Rejected("injected transfer failure".into()));
        }
        self.inner.transfer_from(spender, from, to, amount).await
    }

    async fn mint_to(&self, address: &Address, amount: Amount) -> LedgerResult<()> {
        if self.fail_next_mint.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::Rejected("injected mint failure".into()));
        }
        self.inner.mint_to(address, amount).await
    }

    async fn burn_from(&self, address: &Address, amount: Amount) -> LedgerResult<()> {
        self.inner.burn_from(address, amount).await
    }

    async fn approve(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.inner.approve(owner, spender, amount).await
    }

    async fn allowance(&self, owner: &Address, spender: &Address) -> LedgerResult<Amount> {
        self.inner.allowance(owner, spender).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;

    #[tokio::test]
    async fn test_failure_switch_is_one_shot() {
        let inner = Arc::new(InMemoryLedger::new(Currency::tusd()));
        let flaky = FlakyLedger::new(inner);
        let alice = Address::new("alice");

        flaky.fail_next_mint();

        let first = flaky.mint_to(&alice, Amount::ONE).await;
        assert!(matches!(first, Err(LedgerError::Rejected(_))));

        flaky.mint_to(&alice, Amount::ONE).await.unwrap();
        assert_eq!(flaky.balance_of(&alice).await.unwrap(), Amount::ONE);
    }
}
