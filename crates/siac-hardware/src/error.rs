//! Error types for reading device operations.
//!
//! This module defines error types specific to SI reading device sessions,
//! covering endpoint enumeration, session construction, opening, and
//! transport failures while a session is open.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during reading device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// No input device is open.
    #[error("No input device open")]
    NotOpen,

    /// The session for an endpoint could not be constructed.
    #[error("Construction failed for {endpoint}: {message}")]
    ConstructionFailed { endpoint: String, message: String },

    /// The selected input device could not be opened.
    #[error("Open failed for {endpoint}: {message}")]
    OpenFailed { endpoint: String, message: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Listing the available endpoints failed.
    #[error("Enumeration failed: {message}")]
    Enumeration { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new construction failed error.
    pub fn construction_failed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new open failed error.
    pub fn open_failed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OpenFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new enumeration error.
    pub fn enumeration(message: impl Into<String>) -> Self {
        Self::Enumeration {
            message: message.into(),
        }
    }
}
