//! Core constants for SI card battery classification and display timing.
//!
//! This module collects every fixed threshold the battery monitor relies on.
//! The values come from the reading station vendor's battery guidance and
//! are not exposed to the operator; they only change through a rebuild.
//!
//! # Usage
//!
//! Constants are organized by category for easy discovery:
//!
//! ```
//! use siac_core::constants::*;
//!
//! // Voltage classification
//! assert_eq!(WARNING_VOLTAGE, 2.72);
//!
//! // Battery age classification
//! assert_eq!(BATTERY_SERVICE_YEARS, 3);
//! assert_eq!(REPLACEMENT_WARNING_DAYS, 60);
//!
//! // Display timing
//! use std::time::Duration;
//! let clear_after = Duration::from_millis(DEFAULT_CLEAR_AFTER_MS);
//! assert_eq!(clear_after.as_secs(), 5);
//! ```

// ============================================================================
// Battery Voltage
// ============================================================================

/// Voltage at or below which a battery is flagged for replacement soon (volts).
///
/// Cards whose voltage is above their own battery-low threshold but at or
/// below this value still work, but the operator should plan a replacement.
///
/// # Value: 2.72 V
///
/// # Examples
///
/// ```
/// use siac_core::constants::WARNING_VOLTAGE;
///
/// let voltage = 2.70;
/// assert!(voltage <= WARNING_VOLTAGE);
/// ```
pub const WARNING_VOLTAGE: f64 = 2.72;

// ============================================================================
// Battery Age
// ============================================================================

/// Expected service life of a card battery (years).
///
/// The replacement due date of a battery is its manufacture date plus
/// this many years.
///
/// # Value: 3 years
pub const BATTERY_SERVICE_YEARS: u32 = 3;

/// Days before the replacement due date at which the age verdict turns
/// into a warning.
///
/// # Value: 60 days
///
/// A battery with exactly 60 days remaining is still reported as OK.
pub const REPLACEMENT_WARNING_DAYS: i64 = 60;

/// Display format for the replacement month and year (`Mar 2027`).
pub const REPLACEMENT_MONTH_FORMAT: &str = "%b %Y";

/// Display format for battery dates shown next to a verdict.
pub const BATTERY_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Display Timing
// ============================================================================

/// Time a battery verdict stays on screen before it is cleared (milliseconds).
///
/// Every new card reading restarts this period from zero.
///
/// # Value: 5000ms (5 seconds)
///
/// # Examples
///
/// ```
/// use siac_core::constants::DEFAULT_CLEAR_AFTER_MS;
/// use std::time::Duration;
///
/// let clear_after = Duration::from_millis(DEFAULT_CLEAR_AFTER_MS);
/// ```
pub const DEFAULT_CLEAR_AFTER_MS: u64 = 5000;

// ============================================================================
// Event Processing
// ============================================================================

/// Default capacity of the bounded event and command channels.
///
/// Hardware events arrive at human speed (one card readout every few
/// seconds), so 100 slots are never close to full in practice.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 100;

/// Maximum number of connection state transitions kept in history.
pub const MAX_CONNECTION_HISTORY: usize = 100;

// ============================================================================
// Transport
// ============================================================================

/// Cause message a reading device reports when its transport is lost.
///
/// An error event carrying exactly this cause while a session is connected
/// forces the session to close.
pub const DISCONNECTED_CAUSE: &str = "Disconnected";

/// USB vendor id of the Silicon Labs CP210x bridge used by SI reading stations.
pub const SI_USB_VENDOR_ID: u16 = 0x10C4;

// ============================================================================
// Operator Messages
// ============================================================================

/// Title of blocking error messages.
pub const MSG_ERROR_TITLE: &str = "Error";

/// Title of configuration warnings.
pub const MSG_CONFIG_WARNING_TITLE: &str = "Station configuration";
