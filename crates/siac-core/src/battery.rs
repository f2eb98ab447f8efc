//! Battery health classification for SI card readings.
//!
//! The evaluator turns one [`CardReading`] into a [`BatteryVerdict`] made of
//! two independent classifications:
//!
//! - **Voltage**: compared with `<=` against the card's own battery-low
//!   threshold first, then against the warning voltage (2.72 V).
//! - **Age**: the replacement due date is the battery date plus the service
//!   life (3 years); the verdict depends on the calendar days left until it.
//!
//! | Voltage condition                 | Status  | Message cites   |
//! |-----------------------------------|---------|-----------------|
//! | `v <= threshold`                  | Error   | threshold       |
//! | `threshold < v <= 2.72`           | Warning | 2.72            |
//! | otherwise                         | Ok      | threshold       |
//!
//! | Days until replacement due        | Status  | Message cites         |
//! |-----------------------------------|---------|-----------------------|
//! | `< 0`                             | Error   | 3 years               |
//! | `0..60`                           | Warning | 3 years, month/year   |
//! | `>= 60`                           | Ok      | month/year            |
//!
//! The evaluator is total: any voltage and any date produce a verdict.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use siac_core::{BatteryEvaluator, CardReading, StatusLevel};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
//! let battery_date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//! let reading = CardReading::new("8001234", 2.6, 2.5, battery_date);
//!
//! let verdict = BatteryEvaluator::default().evaluate(&reading, today);
//! assert_eq!(verdict.voltage.status, StatusLevel::Warning);
//! assert_eq!(verdict.age.status, StatusLevel::Ok);
//! ```

use chrono::{Months, NaiveDate};

use crate::constants::REPLACEMENT_MONTH_FORMAT;
use crate::types::{AgeVerdict, BatteryPolicy, BatteryVerdict, CardReading, StatusLevel, VoltageVerdict};

/// Classifies card batteries according to a [`BatteryPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatteryEvaluator {
    policy: BatteryPolicy,
}

impl BatteryEvaluator {
    /// Create an evaluator with a custom policy.
    pub fn new(policy: BatteryPolicy) -> Self {
        Self { policy }
    }

    /// Classify both voltage and age of a reading.
    ///
    /// `today` is the local calendar date the age is measured against.
    pub fn evaluate(&self, reading: &CardReading, today: NaiveDate) -> BatteryVerdict {
        BatteryVerdict {
            card_id: reading.card_id.clone(),
            voltage: self.classify_voltage(reading.battery_voltage, reading.battery_low_threshold),
            age: self.classify_age(reading.battery_date, today),
        }
    }

    /// Classify a battery voltage against the card's low threshold.
    pub fn classify_voltage(&self, voltage: f64, low_threshold: f64) -> VoltageVerdict {
        let warning_voltage = self.policy.warning_voltage;

        let (status, message) = if voltage <= low_threshold {
            (
                StatusLevel::Error,
                format!("Battery voltage at or below {low_threshold} V, the battery must be replaced"),
            )
        } else if voltage <= warning_voltage {
            (
                StatusLevel::Warning,
                format!("Battery voltage at or below {warning_voltage} V, replace the battery soon"),
            )
        } else {
            (
                StatusLevel::Ok,
                format!("Battery voltage above {low_threshold} V"),
            )
        };

        VoltageVerdict {
            status,
            message,
            voltage,
        }
    }

    /// Classify a battery by the time left until its replacement due date.
    pub fn classify_age(&self, battery_date: NaiveDate, today: NaiveDate) -> AgeVerdict {
        let years = self.policy.service_years;
        let replacement_due = replacement_due(battery_date, years);
        let days_remaining = (replacement_due - today).num_days();
        let due_month = replacement_due.format(REPLACEMENT_MONTH_FORMAT);

        let (status, message) = if days_remaining < 0 {
            (
                StatusLevel::Error,
                format!("Battery is older than {years} years, the battery must be replaced"),
            )
        } else if days_remaining < self.policy.warning_window_days {
            (
                StatusLevel::Warning,
                format!("Battery reaches {years} years in {due_month}, replace the battery soon"),
            )
        } else {
            (
                StatusLevel::Ok,
                format!("Battery replacement due {due_month}"),
            )
        };

        AgeVerdict {
            status,
            message,
            battery_date,
            replacement_due,
            days_remaining,
        }
    }
}

/// Date a battery is due for replacement.
///
/// Adding years to 29 February lands on 28 February. Dates too far in the
/// future to represent saturate at the latest representable date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use siac_core::battery::replacement_due;
///
/// let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
/// assert_eq!(replacement_due(leap, 3), NaiveDate::from_ymd_opt(2027, 2, 28).unwrap());
/// ```
pub fn replacement_due(battery_date: NaiveDate, service_years: u32) -> NaiveDate {
    battery_date
        .checked_add_months(Months::new(service_years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MAX)
}
