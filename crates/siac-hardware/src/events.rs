//! Events emitted by a reading device session.
//!
//! A [`DeviceSessionProvider`](crate::traits::DeviceSessionProvider) hands out
//! a single receiver of [`ReaderEvent`]s. Events arrive in the order the
//! device produced them and are consumed by one dispatcher.

use serde::{Deserialize, Serialize};
use siac_core::CardReading;
use siac_core::constants::DISCONNECTED_CAUSE;

use crate::types::{ConfigurationOutcome, DeviceDescriptor, DeviceState};

/// Event from the reading device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReaderEvent {
    /// One or more cards were read completely.
    CardRead(Vec<CardReading>),

    /// The hardware state of the input device changed.
    DeviceStateChanged {
        old: DeviceState,
        new: DeviceState,
    },

    /// The input device of the reader changed.
    DeviceChanged(DeviceDescriptor),

    /// The configuration of the attached station was read.
    ConfigurationRead(ConfigurationOutcome),

    /// An error occurred in the reader or its transport.
    Error {
        /// Context message from the reader.
        message: String,

        /// Message of the underlying failure, if any.
        cause: Option<String>,
    },

    /// Diagnostic log line from the reader.
    LogMessage(String),
}

impl ReaderEvent {
    /// Create an error event.
    pub fn error(message: impl Into<String>, cause: Option<String>) -> Self {
        Self::Error {
            message: message.into(),
            cause,
        }
    }

    /// Create the error event a device raises when its transport is lost.
    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::error(message, Some(DISCONNECTED_CAUSE.to_string()))
    }

    /// Returns `true` if this is an error event whose cause is exactly
    /// the transport-lost message.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::Error { cause: Some(cause), .. } if cause == DISCONNECTED_CAUSE
        )
    }

    /// Short event name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CardRead(_) => "card_read",
            Self::DeviceStateChanged { .. } => "device_state_changed",
            Self::DeviceChanged(_) => "device_changed",
            Self::ConfigurationRead(_) => "configuration_read",
            Self::Error { .. } => "error",
            Self::LogMessage(_) => "log_message",
        }
    }
}
