//! In-memory token ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use remitbridge_common::{Address, Amount, Currency};

use crate::error::{LedgerError, LedgerResult};
use crate::token::TokenLedger;

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

/// Token ledger backed by process memory.
///
/// Balances and allowances live behind a single mutex, so a transfer's debit
/// and credit form one critical section. Accounts are created lazily and a
/// failed operation leaves the state untouched.
pub struct InMemoryLedger {
    currency: Currency,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger for the given currency.
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Overwrite a balance directly. Test setup convenience.
    pub fn set_balance(&self, address: &Address, amount: Amount) {
        self.state.lock().balances.insert(address.clone(), amount);
    }

    /// Sum of all balances on this ledger.
    pub fn total_supply(&self) -> Amount {
        let state = self.state.lock();
        state
            .balances
            .values()
            .fold(Amount::ZERO, |acc, b| {
                acc.checked_add(*b).unwrap_or(Amount::from_raw(u64::MAX))
            })
    }
}

#[async_trait]
impl TokenLedger for InMemoryLedger {
    fn currency(&self) -> &Currency {
        &self.currency
    }

    async fn balance_of(&self, address: &Address) -> LedgerResult<Amount> {
        Ok(self
            .state
            .lock()
            .balances
            .get(address)
            .copied()
            .unwrap_or_default())
    }

    async fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        let mut state = self.state.lock();

        let from_balance = state.balances.get(from).copied().unwrap_or_default();
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available: from_balance,
            });
        }

        // A self-transfer of a held balance is a no-op
        if from == to {
            return Ok(());
        }

        let to_balance = state.balances.get(to).copied().unwrap_or_default();
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;

        state
            .balances
            .insert(from.clone(), from_balance.checked_sub(amount).unwrap_or_default());
        state.balances.insert(to.clone(), new_to);

        debug!(currency = %self.currency, %from, %to, %amount, "Transfer applied");
        Ok(())
    }

    async fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock();

        let key = (from.clone(), spender.clone());
        let allowed = state.allowances.get(&key).copied().unwrap_or_default();
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowed,
            });
        }

        let from_balance = state.balances.get(from).copied().unwrap_or_default();
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available: from_balance,
            });
        }

        if from != to {
            let to_balance = state.balances.get(to).copied().unwrap_or_default();
            let new_to = to_balance
                .checked_add(amount)
                .ok_or(LedgerError::AmountOverflow)?;
            state
                .balances
                .insert(from.clone(), from_balance.checked_sub(amount).unwrap_or_default());
            state.balances.insert(to.clone(), new_to);
        }
        state
            .allowances
            .insert(key, allowed.checked_sub(amount).unwrap_or_default());

        debug!(currency = %self.currency, %spender, %from, %to, %amount, "Delegated transfer applied");
        Ok(())
    }

    async fn mint_to(&self, address: &Address, amount: Amount) -> LedgerResult<()> {
        let mut state = self.state.lock();

        let balance = state.balances.get(address).copied().unwrap_or_default();
        let new_balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;
        state.balances.insert(address.clone(), new_balance);

        debug!(currency = %self.currency, %address, %amount, "Mint applied");
        Ok(())
    }

    async fn burn_from(&self, address: &Address, amount: Amount) -> LedgerResult<()> {
        let mut state = self.state.lock();

        let balance = state.balances.get(address).copied().unwrap_or_default();
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                required: amount,
                available: balance,
            })?;
        state.balances.insert(address.clone(), new_balance);

        debug!(currency = %self.currency, %address, %amount, "Burn applied");
        Ok(())
    }

    async fn approve(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.state
            .lock()
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
        Ok(())
    }

    async fn allowance(&self, owner: &Address, spender: &Address) -> LedgerResult<Amount> {
        Ok(self
            .state
            .lock()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default())
    }
}
