//! Core domain types for the SI card battery monitor.
//!
//! This crate holds the pieces every other crate agrees on: battery
//! thresholds, the card reading and verdict types, the error type, and the
//! [`BatteryEvaluator`] that classifies a reading.

pub mod battery;
pub mod constants;
pub mod error;
pub mod types;

pub use battery::BatteryEvaluator;
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
