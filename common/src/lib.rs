//! RemitBridge Common Types
//!
//! Shared types used across the RemitBridge settlement engine: identifiers
//! and fixed-point monetary values. All money is integer fixed-point with
//! six fractional digits; no floating point appears anywhere on the
//! conversion path.

pub mod identifiers;
pub mod monetary;

pub use identifiers::*;
pub use monetary::*;
