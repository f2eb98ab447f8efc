use crate::constants::{
    BATTERY_DATE_FORMAT, BATTERY_SERVICE_YEARS, REPLACEMENT_WARNING_DAYS, WARNING_VOLTAGE,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification level shared by the voltage and age verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Ok,
    Warning,
    Error,
}

impl StatusLevel {
    /// Glyph shown next to the verdict on the operator display.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            StatusLevel::Ok => "✔",
            StatusLevel::Warning => "❗",
            StatusLevel::Error => "✘",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StatusLevel::Ok => write!(f, "OK"),
            StatusLevel::Warning => write!(f, "Warning"),
            StatusLevel::Error => write!(f, "Error"),
        }
    }
}

/// Battery telemetry of one SI card at readout time.
///
/// Produced by the reading device, consumed once by the evaluator and then
/// dropped; readings are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardReading {
    /// SI card number as printed on the card.
    pub card_id: String,

    /// Measured battery voltage (volts).
    pub battery_voltage: f64,

    /// Device-reported voltage at or below which the battery has failed.
    pub battery_low_threshold: f64,

    /// Manufacture or install date of the battery.
    pub battery_date: NaiveDate,

    /// When the card was read.
    pub read_at: DateTime<Utc>,
}

impl CardReading {
    /// Create a reading stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use siac_core::CardReading;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// let reading = CardReading::new("8001234", 3.01, 2.5, date);
    /// assert_eq!(reading.card_id, "8001234");
    /// ```
    pub fn new(
        card_id: impl Into<String>,
        battery_voltage: f64,
        battery_low_threshold: f64,
        battery_date: NaiveDate,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            battery_voltage,
            battery_low_threshold,
            battery_date,
            read_at: Utc::now(),
        }
    }
}

/// Voltage half of a battery verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageVerdict {
    pub status: StatusLevel,
    pub message: String,
    /// Measured voltage the verdict was derived from.
    pub voltage: f64,
}

impl VoltageVerdict {
    /// Measured voltage for display (`2.95V`), unrounded so the text never
    /// lands on the other side of a threshold from its status.
    #[must_use]
    pub fn voltage_text(&self) -> String {
        format!("{}V", self.voltage)
    }
}

/// Age half of a battery verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeVerdict {
    pub status: StatusLevel,
    pub message: String,
    pub battery_date: NaiveDate,
    /// Battery date plus the service life.
    pub replacement_due: NaiveDate,
    /// Calendar days from today until `replacement_due`; negative once overdue.
    pub days_remaining: i64,
}

impl AgeVerdict {
    /// Battery date formatted for display.
    #[must_use]
    pub fn battery_date_text(&self) -> String {
        self.battery_date.format(BATTERY_DATE_FORMAT).to_string()
    }
}

/// Combined classification of one card reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryVerdict {
    pub card_id: String,
    pub voltage: VoltageVerdict,
    pub age: AgeVerdict,
}

impl BatteryVerdict {
    /// The more severe of the two statuses.
    #[must_use]
    pub fn overall(&self) -> StatusLevel {
        self.voltage.status.max(self.age.status)
    }
}

/// Thresholds used to classify card batteries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryPolicy {
    /// Voltage at or below which a working battery gets a warning.
    pub warning_voltage: f64,

    /// Battery service life in years.
    pub service_years: u32,

    /// Days before the due date at which the age verdict becomes a warning.
    pub warning_window_days: i64,
}

impl Default for BatteryPolicy {
    fn default() -> Self {
        Self {
            warning_voltage: WARNING_VOLTAGE,
            service_years: BATTERY_SERVICE_YEARS,
            warning_window_days: REPLACEMENT_WARNING_DAYS,
        }
    }
}
