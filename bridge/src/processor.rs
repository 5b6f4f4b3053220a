//! Settlement orchestration across the two token ledgers.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, instrument, warn};

use remitbridge_common::{Address, Amount, BasisPoints, Currency, Rate, SettlementId};
use remitbridge_ledger::TokenLedger;

use crate::auth::AdminPolicy;
use crate::config::BridgeConfig;
use crate::convert::{convert, Quote};
use crate::costs::{CostLedger, CostRecord};
use crate::error::{BridgeError, BridgeResult};
use crate::events::{BridgeEvent, EventBus};
use crate::registry::{RateConfig, RateRegistry};

/// Outcome of one processed settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    /// Settlement identifier.
    pub id: SettlementId,
    /// Target-currency amount credited to the requester.
    pub output_amount: Amount,
    /// Source-currency fee moved to the fee collector.
    pub fee_amount: Amount,
}

/// An applied ledger mutation together with enough context to reverse it.
enum AppliedOp {
    Mint {
        ledger: Arc<dyn TokenLedger>,
        to: Address,
        amount: Amount,
    },
    Transfer {
        ledger: Arc<dyn TokenLedger>,
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approve {
        ledger: Arc<dyn TokenLedger>,
        owner: Address,
        spender: Address,
        prior: Amount,
    },
    TransferFrom {
        ledger: Arc<dyn TokenLedger>,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        prior_allowance: Amount,
    },
}

/// Journal of applied mutations within one settlement.
///
/// When a later step fails, the journal unwinds with compensating actions
/// in reverse order, so no partial settlement is observable afterwards.
struct Journal {
    applied: Vec<AppliedOp>,
}

impl Journal {
    fn new() -> Self {
        Self {
            applied: Vec::with_capacity(4),
        }
    }

    fn minted(&mut self, ledger: Arc<dyn TokenLedger>, to: Address, amount: Amount) {
        self.applied.push(AppliedOp::Mint { ledger, to, amount });
    }

    fn transferred(
        &mut self,
        ledger: Arc<dyn TokenLedger>,
        from: Address,
        to: Address,
        amount: Amount,
    ) {
        self.applied.push(AppliedOp::Transfer {
            ledger,
            from,
            to,
            amount,
        });
    }

    fn approved(
        &mut self,
        ledger: Arc<dyn TokenLedger>,
        owner: Address,
        spender: Address,
        prior: Amount,
    ) {
        self.applied.push(AppliedOp::Approve {
            ledger,
            owner,
            spender,
            prior,
        });
    }

    fn pulled(
        &mut self,
        ledger: Arc<dyn TokenLedger>,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        prior_allowance: Amount,
    ) {
        self.applied.push(AppliedOp::TransferFrom {
            ledger,
            spender,
            from,
            to,
            amount,
            prior_allowance,
        });
    }

    async fn unwind(mut self) {
        while let Some(op) = self.applied.pop() {
            let outcome = match &op {
                AppliedOp::Mint { ledger, to, amount } => ledger.burn_from(to, *amount).await,
                AppliedOp::Transfer {
                    ledger,
                    from,
                    to,
                    amount,
                } => ledger.transfer(to, from, *amount).await,
                AppliedOp::Approve {
                    ledger,
                    owner,
                    spender,
                    prior,
                } => ledger.approve(owner, spender, *prior).await,
                AppliedOp::TransferFrom {
                    ledger,
                    spender,
                    from,
                    to,
                    amount,
                    prior_allowance,
                } => match ledger.transfer(to, from, *amount).await {
                    Ok(()) => ledger.approve(from, spender, *prior_allowance).await,
                    Err(err) => Err(err),
                },
            };
            if let Err(err) = outcome {
                error!(error = %err, "Compensating action failed during rollback");
            }
        }
    }
}

/// The currency-conversion settlement engine.
///
/// Each `process` or administrative mutation executes as one indivisible
/// unit of work relative to the registry, the cost histories, and the
/// underlying balances: either every write lands or none do.
pub struct RemittanceBridge {
    registry: RateRegistry,
    costs: CostLedger,
    source: Arc<dyn TokenLedger>,
    target: Arc<dyn TokenLedger>,
    policy: Arc<dyn AdminPolicy>,
    events: EventBus,
    config: BridgeConfig,
    fee_collector: RwLock<Address>,
    // serializes mutating settlement work; reads stay concurrent
    settle_lock: Mutex<()>,
}

impl RemittanceBridge {
    /// Create an engine over two ledger instances, one per currency.
    pub fn new(
        config: BridgeConfig,
        source: Arc<dyn TokenLedger>,
        target: Arc<dyn TokenLedger>,
        policy: Arc<dyn AdminPolicy>,
    ) -> BridgeResult<Self> {
        config.validate().map_err(BridgeError::Configuration)?;

        let events = EventBus::new(config.event_capacity);
        let registry = RateRegistry::new(config.rates, policy.clone(), events.clone());
        let costs = CostLedger::new(policy.clone(), events.clone());
        let fee_collector = RwLock::new(config.fee_collector.clone());

        Ok(Self {
            registry,
            costs,
            source,
            target,
            policy,
            events,
            config,
            fee_collector,
            settle_lock: Mutex::new(()),
        })
    }

    /// Process one settlement: convert, debit, split the fee, credit.
    ///
    /// The mutating steps form one logical transaction; any adapter failure
    /// rolls back every prior mutation of the same call before the error is
    /// returned.
    #[instrument(skip(self), fields(requester = %requester, amount = %source_amount))]
    pub async fn process(
        &self,
        requester: &Address,
        source_amount: Amount,
        recipient_label: &str,
    ) -> BridgeResult<SettlementResult> {
        if source_amount.is_zero() {
            return Err(BridgeError::InvalidAmount);
        }

        let RateConfig {
            exchange_rate,
            fee_bps,
        } = self.registry.snapshot();
        let quote = convert(source_amount, exchange_rate, fee_bps)?;
        let source_fee = fee_bps
            .apply(source_amount)
            .ok_or(BridgeError::AmountOverflow)?;

        let _guard = self.settle_lock.lock().await;

        let mut journal = Journal::new();
        if let Err(err) = self
            .settle(requester, source_amount, source_fee, &quote, &mut journal)
            .await
        {
            warn!(%requester, error = %err, "Settlement failed, rolling back");
            journal.unwind().await;
            return Err(err);
        }

        let id = SettlementId::new();
        info!(
            settlement_id = %id,
            %requester,
            source = %source_amount,
            target = %quote.output,
            fee = %source_fee,
            "Remittance processed"
        );
        self.events.emit(BridgeEvent::RemittanceProcessed {
            id,
            requester: requester.clone(),
            source_amount,
            target_amount: quote.output,
            recipient: recipient_label.to_string(),
        });

        Ok(SettlementResult {
            id,
            output_amount: quote.output,
            fee_amount: source_fee,
        })
    }

    async fn settle(
        &self,
        requester: &Address,
        source_amount: Amount,
        source_fee: Amount,
        quote: &Quote,
        journal: &mut Journal,
    ) -> BridgeResult<()> {
        // The custody account is the engine's spending identity; the debit
        // consumes the allowance the requester granted it.
        let spender = &self.config.custody;

        if self.config.faucet_enabled {
            // Test-environment faucet: fund the requester and grant the
            // engine the matching allowance before debiting
            self.source.mint_to(requester, source_amount).await?;
            journal.minted(self.source.clone(), requester.clone(), source_amount);

            let prior = self.source.allowance(requester, spender).await?;
            let granted = prior
                .checked_add(source_amount)
                .ok_or(BridgeError::AmountOverflow)?;
            self.source.approve(requester, spender, granted).await?;
            journal.approved(
                self.source.clone(),
                requester.clone(),
                spender.clone(),
                prior,
            );
        }

        let prior_allowance = self.source.allowance(requester, spender).await?;
        self.source
            .transfer_from(spender, requester, &self.config.custody, source_amount)
            .await?;
        journal.pulled(
            self.source.clone(),
            spender.clone(),
            requester.clone(),
            self.config.custody.clone(),
            source_amount,
            prior_allowance,
        );

        if !source_fee.is_zero() {
            let collector = self.fee_collector.read().clone();
            self.source
                .transfer(&self.config.custody, &collector, source_fee)
                .await?;
            journal.transferred(
                self.source.clone(),
                self.config.custody.clone(),
                collector,
                source_fee,
            );
        }

        self.target.mint_to(requester, quote.output).await?;
        journal.minted(self.target.clone(), requester.clone(), quote.output);

        Ok(())
    }

    /// Replace the exchange rate. Administrative.
    pub fn set_rate(&self, caller: &Address, rate: Rate) -> BridgeResult<()> {
        self.registry.set_rate(caller, rate)
    }

    /// Replace the fee rate. Administrative.
    pub fn set_fee_rate(&self, caller: &Address, fee_bps: BasisPoints) -> BridgeResult<()> {
        self.registry.set_fee_rate(caller, fee_bps)
    }

    /// Current exchange rate.
    pub fn current_rate(&self) -> Rate {
        self.registry.current_rate()
    }

    /// Current fee rate.
    pub fn current_fee_rate(&self) -> BasisPoints {
        self.registry.current_fee_rate()
    }

    /// Append a cost entry for `user` at the registry's current cross rate.
    /// Administrative.
    pub fn record_cost(
        &self,
        caller: &Address,
        user: &Address,
        network_fee: Amount,
        service_fee: Amount,
    ) -> BridgeResult<CostRecord> {
        self.costs.record_cost(
            caller,
            user,
            network_fee,
            service_fee,
            self.registry.current_rate(),
        )
    }

    /// Last-appended cost record for `user`.
    pub fn latest_cost(&self, user: &Address) -> BridgeResult<CostRecord> {
        self.costs.latest_cost(user)
    }

    /// Number of cost records appended for `user`.
    pub fn cost_count(&self, user: &Address) -> usize {
        self.costs.cost_count(user)
    }

    /// Replace the fee collector address. Administrative.
    pub fn set_fee_collector(&self, caller: &Address, collector: Address) -> BridgeResult<()> {
        if !self.policy.is_admin(caller) {
            return Err(BridgeError::Unauthorized);
        }

        *self.fee_collector.write() = collector.clone();
        info!(%caller, %collector, "Fee collector updated");
        self.events
            .emit(BridgeEvent::FeeCollectorUpdated { collector });
        Ok(())
    }

    /// Current fee collector address.
    pub fn fee_collector(&self) -> Address {
        self.fee_collector.read().clone()
    }

    /// Move custodied balance of `currency` to the caller.
    ///
    /// Fund recovery only; never part of the normal settlement flow.
    /// Administrative.
    #[instrument(skip(self), fields(caller = %caller, currency = %currency))]
    pub async fn emergency_withdraw(
        &self,
        caller: &Address,
        currency: &Currency,
        amount: Amount,
    ) -> BridgeResult<()> {
        if !self.policy.is_admin(caller) {
            return Err(BridgeError::Unauthorized);
        }
        if amount.is_zero() {
            return Err(BridgeError::InvalidAmount);
        }

        let ledger = if currency == self.source.currency() {
            &self.source
        } else if currency == self.target.currency() {
            &self.target
        } else {
            return Err(BridgeError::UnsupportedCurrency(currency.clone()));
        };

        let _guard = self.settle_lock.lock().await;
        ledger
            .transfer(&self.config.custody, caller, amount)
            .await?;

        warn!(%caller, %currency, %amount, "Emergency withdrawal executed");
        self.events.emit(BridgeEvent::EmergencyWithdrawal {
            currency: currency.clone(),
            amount,
            to: caller.clone(),
        });
        Ok(())
    }

    /// Subscribe to engine notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }
}
