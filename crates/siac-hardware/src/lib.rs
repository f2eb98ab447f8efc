//! Reading device abstraction layer for the SI-card battery monitor.
//!
//! This crate defines how the monitor talks to an SI reading station: the
//! endpoint and station types, the events a reader emits, and the traits a
//! reader implements. A scriptable mock reader is included for development
//! and testing without a physical station.
//!
//! # Design Philosophy
//!
//! - **Async-first**: session operations use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Event-driven**: a reader hands out a single receiver of
//!   [`ReaderEvent`]s; the consumer never polls the device.
//! - **Enum dispatch**: runtime reader selection goes through
//!   [`AnyReader`](devices::AnyReader) instead of trait objects.
//!
//! # Example
//!
//! ```
//! use siac_hardware::mock::MockReader;
//! use siac_hardware::traits::{DeviceSessionProvider, PortEnumerator};
//!
//! #[tokio::main]
//! async fn main() -> siac_hardware::Result<()> {
//!     let (mut reader, _handle) = MockReader::with_endpoints(["COM3"]);
//!     let mut events = reader.subscribe().expect("first subscription");
//!
//!     let endpoint = reader.list_endpoints().remove(0);
//!     reader.select_input(&endpoint).await?;
//!     reader.open_input().await?;
//!
//!     while let Ok(event) = events.try_recv() {
//!         println!("{}", event.kind());
//!     }
//!     assert!(reader.is_input_open());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `hardware-serial`: enumerate SI stations attached as USB serial
//!   devices with [`serial::SerialPortEnumerator`].

pub mod devices;
pub mod error;
pub mod events;
pub mod mock;
#[cfg(feature = "hardware-serial")]
pub mod serial;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::AnyReader;
pub use error::{HardwareError, Result};
pub use events::ReaderEvent;
pub use traits::{DeviceSessionProvider, PortEnumerator};
pub use types::{
    ConfigurationFailure, ConfigurationOutcome, DeviceDescriptor, DeviceEndpoint, DeviceState,
    EndpointKind, OperatingMode, ProductFamily, ReaderDeviceType, StationConfiguration,
};
