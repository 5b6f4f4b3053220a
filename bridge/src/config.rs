//! Engine configuration.

use serde::{Deserialize, Serialize};

use remitbridge_common::Address;

use crate::registry::{RateConfig, MAX_FEE_BPS};

/// Settlement engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Custody account holding source funds between the debit and the fee
    /// split.
    pub custody: Address,
    /// Initial fee collector address.
    pub fee_collector: Address,
    /// Initial registry values.
    pub rates: RateConfig,
    /// Mint the inbound source amount to the requester and grant the engine
    /// the matching spending allowance before debiting (test-environment
    /// faucet). When disabled, a pre-existing deposit and an allowance for
    /// the custody account are required instead.
    pub faucet_enabled: bool,
    /// Event bus buffer capacity per subscriber.
    pub event_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            custody: Address::new("bridge_custody"),
            fee_collector: Address::new("bridge_fee_collector"),
            rates: RateConfig::default(),
            faucet_enabled: true,
            event_capacity: 64,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(custody) = std::env::var("REMITBRIDGE_CUSTODY") {
            config.custody = Address::new(custody);
        }

        if let Ok(collector) = std::env::var("REMITBRIDGE_FEE_COLLECTOR") {
            config.fee_collector = Address::new(collector);
        }

        if let Ok(faucet) = std::env::var("REMITBRIDGE_FAUCET") {
            if let Ok(enabled) = faucet.parse() {
                config.faucet_enabled = enabled;
            }
        }

        if let Ok(capacity) = std::env::var("REMITBRIDGE_EVENT_CAPACITY") {
            if let Ok(capacity) = capacity.parse() {
                config.event_capacity = capacity;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.custody.is_valid() {
            return Err(format!("Invalid custody address: {}", self.custody));
        }

        if !self.fee_collector.is_valid() {
            return Err(format!(
                "Invalid fee collector address: {}",
                self.fee_collector
            ));
        }

        if self.custody == self.fee_collector {
            return Err("Custody and fee collector must be distinct".to_string());
        }

        if self.rates.exchange_rate.is_zero() {
            return Err("Exchange rate must be positive".to_string());
        }

        if self.rates.fee_bps > MAX_FEE_BPS {
            return Err(format!(
                "Fee rate {} exceeds maximum {}",
                self.rates.fee_bps, MAX_FEE_BPS
            ));
        }

        if self.event_capacity == 0 {
            return Err("Event capacity cannot be 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remitbridge_common::{BasisPoints, Rate};

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custody_must_differ_from_collector() {
        let mut config = BridgeConfig::default();
        config.fee_collector = config.custody.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rate_is_invalid() {
        let mut config = BridgeConfig::default();
        config.rates.exchange_rate = Rate::from_raw(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fee_above_cap_is_invalid() {
        let mut config = BridgeConfig::default();
        config.rates.fee_bps = BasisPoints::new(501);
        assert!(config.validate().is_err());
    }
}
