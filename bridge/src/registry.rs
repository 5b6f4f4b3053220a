//! Exchange-rate and fee-rate registry.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use remitbridge_common::{Address, BasisPoints, Rate};

use crate::auth::AdminPolicy;
use crate::error::{BridgeError, BridgeResult};
use crate::events::{BridgeEvent, EventBus};

/// Maximum admissible fee rate: 5%.
pub const MAX_FEE_BPS: BasisPoints = BasisPoints::new(500);

/// Current conversion parameters.
///
/// Process-wide singleton, created at engine initialization and updated in
/// place through the administrative surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Target units per source unit, fixed-point(6).
    pub exchange_rate: Rate,
    /// Proportional fee taken per settlement.
    pub fee_bps: BasisPoints,
}

impl Default for RateConfig {
    fn default() -> Self {
        // 0.9 target per source unit at a 0.5% fee, the test-bridge defaults
        Self {
            exchange_rate: Rate::from_raw(900_000),
            fee_bps: BasisPoints::new(50),
        }
    }
}

/// Holder of the current exchange rate and fee rate.
///
/// Reads are open to anyone; both mutations require the administrative
/// capability and are rejected before any state change when the bounds
/// check fails.
pub struct RateRegistry {
    config: RwLock<RateConfig>,
    policy: Arc<dyn AdminPolicy>,
    events: EventBus,
}

impl RateRegistry {
    /// Create a registry with initial values.
    pub fn new(initial: RateConfig, policy: Arc<dyn AdminPolicy>, events: EventBus) -> Self {
        Self {
            config: RwLock::new(initial),
            policy,
            events,
        }
    }

    /// Replace the exchange rate.
    pub fn set_rate(&self, caller: &Address, rate: Rate) -> BridgeResult<()> {
        if !self.policy.is_admin(caller) {
            return Err(BridgeError::Unauthorized);
        }
        if rate.is_zero() {
            return Err(BridgeError::InvalidRate);
        }

        self.config.write().exchange_rate = rate;
        info!(%caller, %rate, "Exchange rate updated");
        self.events.emit(BridgeEvent::RateUpdated { rate });
        Ok(())
    }

    /// Replace the fee rate. `MAX_FEE_BPS` itself is allowed.
    pub fn set_fee_rate(&self, caller: &Address, fee_bps: BasisPoints) -> BridgeResult<()> {
        if !self.policy.is_admin(caller) {
            return Err(BridgeError::Unauthorized);
        }
        if fee_bps > MAX_FEE_BPS {
            return Err(BridgeError::FeeTooHigh {
                bps: fee_bps.raw(),
                max: MAX_FEE_BPS.raw(),
            });
        }

        self.config.write().fee_bps = fee_bps;
        info!(%caller, %fee_bps, "Fee rate updated");
        self.events.emit(BridgeEvent::FeeRateUpdated { fee_bps });
        Ok(())
    }

    /// Current exchange rate.
    pub fn current_rate(&self) -> Rate {
        self.config.read().exchange_rate
    }

    /// Current fee rate.
    pub fn current_fee_rate(&self) -> BasisPoints {
        self.config.read().fee_bps
    }

    /// Consistent snapshot of both values.
    pub fn snapshot(&self) -> RateConfig {
        *self.config.read()
    }
}
