//! RemitBridge Settlement Engine
//!
//! Converts an inbound amount of a source test-currency into a target
//! currency at an administrator-configured exchange rate, collects a
//! proportional fee, moves balances across two token ledgers atomically,
//! and keeps an append-only cost history per requesting party.
//!
//! The two underlying currency ledgers are external collaborators consumed
//! through the [`remitbridge_ledger::TokenLedger`] contract; any
//! caller-facing transport sits above this crate.

pub mod auth;
pub mod config;
pub mod convert;
pub mod costs;
pub mod error;
pub mod events;
pub mod processor;
pub mod registry;

pub use auth::{AdminPolicy, StaticAdminPolicy};
pub use config::BridgeConfig;
pub use convert::{convert, Quote};
pub use costs::{CostLedger, CostRecord};
pub use error::{BridgeError, BridgeResult};
pub use events::{BridgeEvent, EventBus};
pub use processor::{RemittanceBridge, SettlementResult};
pub use registry::{RateConfig, RateRegistry, MAX_FEE_BPS};
