//! Append-only per-requester cost history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use remitbridge_common::{Address, Amount, CostRecordId, Rate};

use crate::auth::AdminPolicy;
use crate::error::{BridgeError, BridgeResult};
use crate::events::{BridgeEvent, EventBus};

/// One immutable settlement-cost entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Unique record ID.
    pub id: CostRecordId,
    /// Nominal source-leg rate.
    pub source_rate: Rate,
    /// Cross rate in force when the record was taken.
    pub cross_rate: Rate,
    /// Nominal target-leg rate.
    pub target_rate: Rate,
    /// Network (gas) cost of the settlement.
    pub network_fee: Amount,
    /// Proportional service fee.
    pub service_fee: Amount,
    /// Sum of both fees.
    pub total_cost: Amount,
    /// When the record was appended.
    pub recorded_at: DateTime<Utc>,
}

/// Append-only history of settlement costs, keyed by requester.
///
/// One history per requester, created lazily on first append and never
/// deleted. Insertion order is significant: the latest record is the last
/// one appended. No mutation or deletion operation exists.
pub struct CostLedger {
    histories: DashMap<Address, Vec<CostRecord>>,
    policy: Arc<dyn AdminPolicy>,
    events: EventBus,
}

impl CostLedger {
    /// Create an empty cost ledger.
    pub fn new(policy: Arc<dyn AdminPolicy>, events: EventBus) -> Self {
        Self {
            histories: DashMap::new(),
            policy,
            events,
        }
    }

    /// Append a cost entry for `user`.
    ///
    /// Requires the administrative capability. The registry's cross rate is
    /// recorded for all three legs; the source and target legs are nominal
    /// placeholders until the bridge settles through real intermediate
    /// markets.
    pub fn record_cost(
        &self,
        caller: &Address,
        user: &Address,
        network_fee: Amount,
        service_fee: Amount,
        cross_rate: Rate,
    ) -> BridgeResult<CostRecord> {
        if !self.policy.is_admin(caller) {
            return Err(BridgeError::Unauthorized);
        }

        let total_cost = network_fee
            .checked_add(service_fee)
            .ok_or(BridgeError::AmountOverflow)?;

        let record = CostRecord {
            id: CostRecordId::new(),
            source_rate: cross_rate,
            cross_rate,
            target_rate: cross_rate,
            network_fee,
            service_fee,
            total_cost,
            recorded_at: Utc::now(),
        };

        self.histories
            .entry(user.clone())
            .or_default()
            .push(record.clone());

        info!(%user, %total_cost, "Remittance cost recorded");
        self.events.emit(BridgeEvent::RemittanceCostRecorded {
            user: user.clone(),
            source_rate: record.source_rate,
            cross_rate: record.cross_rate,
            target_rate: record.target_rate,
            network_fee,
            service_fee,
            total_cost,
        });

        Ok(record)
    }

    /// Last-appended record for `user`.
    pub fn latest_cost(&self, user: &Address) -> BridgeResult<CostRecord> {
        self.histories
            .get(user)
            .and_then(|history| history.last().cloned())
            .ok_or_else(|| BridgeError::NoHistory(user.clone()))
    }

    /// Number of records appended for `user`, zero if none exist.
    pub fn cost_count(&self, user: &Address) -> usize {
        self.histories.get(user).map(|h| h.len()).unwrap_or(0)
    }
}
