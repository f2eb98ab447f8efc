//! Monitor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use siac_core::constants::{DEFAULT_CLEAR_AFTER_MS, DEFAULT_EVENT_CHANNEL_CAPACITY};
use siac_core::{BatteryPolicy, Error, Result};

/// Configuration for a [`Monitor`](crate::Monitor).
///
/// The operator never edits this; production uses [`Default`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use siac_monitor::MonitorConfig;
///
/// let config = MonitorConfig::default().with_clear_after(Duration::from_millis(250));
/// assert_eq!(config.clear_after(), Duration::from_millis(250));
/// assert_eq!(config.event_channel_capacity, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay after a readout before the verdicts are blanked, in milliseconds.
    pub clear_after_ms: u64,

    /// Capacity of the monitor's command channel.
    pub event_channel_capacity: usize,

    /// Thresholds for battery classification.
    pub battery_policy: BatteryPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            clear_after_ms: DEFAULT_CLEAR_AFTER_MS,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            battery_policy: BatteryPolicy::default(),
        }
    }
}

impl MonitorConfig {
    pub fn clear_after(&self) -> Duration {
        Duration::from_millis(self.clear_after_ms)
    }

    pub fn with_clear_after(mut self, delay: Duration) -> Self {
        self.clear_after_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    pub fn with_battery_policy(mut self, policy: BatteryPolicy) -> Self {
        self.battery_policy = policy;
        self
    }

    /// Check the configuration before a monitor is built from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the channel capacity is zero or the
    /// battery policy has a non-positive warning voltage.
    pub fn validate(&self) -> Result<()> {
        if self.event_channel_capacity == 0 {
            return Err(Error::Config(
                "event channel capacity must be at least 1".to_string(),
            ));
        }
        let warning_voltage = self.battery_policy.warning_voltage;
        if !warning_voltage.is_finite() || warning_voltage <= 0.0 {
            return Err(Error::Config(format!(
                "warning voltage must be positive, got {}",
                warning_voltage
            )));
        }
        Ok(())
    }
}
