//! Domain notifications emitted by the engine.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use remitbridge_common::{Address, Amount, BasisPoints, Currency, Rate, SettlementId};

/// A notification emitted after a committed state change.
///
/// Events describe effects that have already happened; observers cannot
/// veto or alter them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// The exchange rate was replaced.
    RateUpdated { rate: Rate },

    /// The fee rate was replaced.
    FeeRateUpdated { fee_bps: BasisPoints },

    /// A settlement ran to completion.
    RemittanceProcessed {
        id: SettlementId,
        requester: Address,
        source_amount: Amount,
        target_amount: Amount,
        recipient: String,
    },

    /// A cost entry was appended to a requester's history.
    RemittanceCostRecorded {
        user: Address,
        source_rate: Rate,
        cross_rate: Rate,
        target_rate: Rate,
        network_fee: Amount,
        service_fee: Amount,
        total_cost: Amount,
    },

    /// The fee collector address was replaced.
    FeeCollectorUpdated { collector: Address },

    /// Custodied funds were recovered to the administrative account.
    EmergencyWithdrawal {
        currency: Currency,
        amount: Amount,
        to: Address,
    },
}

/// Broadcast fan-out for engine notifications.
///
/// Emission never blocks. Events sent while no observer is subscribed are
/// dropped; a slow observer that falls behind the channel capacity loses
/// the oldest events, not the engine's progress.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers.
    pub fn emit(&self, event: BridgeEvent) {
        debug!(?event, "Emitting bridge event");
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let event = BridgeEvent::RateUpdated {
            rate: Rate::from_raw(900_000),
        };
        bus.emit(event.clone());

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn test_emit_without_subscribers_is_harmless() {
        let bus = EventBus::new(8);
        bus.emit(BridgeEvent::FeeRateUpdated {
            fee_bps: BasisPoints::new(50),
        });
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = BridgeEvent::FeeCollectorUpdated {
            collector: Address::new("bridge_fees"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"fee_collector_updated\""));
    }
}
