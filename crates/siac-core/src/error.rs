use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Endpoint selection errors
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    // Session errors
    #[error("Device construction failed for {endpoint}: {reason}")]
    DeviceConstructionError { endpoint: String, reason: String },

    #[error("Device open failed for {endpoint}: {reason}")]
    DeviceOpenError { endpoint: String, reason: String },

    #[error("A device session is already connected")]
    AlreadyConnected,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Dispatcher errors
    #[error("Monitor stopped")]
    MonitorStopped,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
