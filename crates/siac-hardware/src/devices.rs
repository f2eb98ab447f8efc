//! Enum wrapper for reading device dispatch.
//!
//! Native `async fn` in traits (RPITIT, Rust Edition 2024) is not
//! object-safe, so `Box<dyn DeviceSessionProvider>` is unavailable. The
//! [`AnyReader`] enum provides concrete type dispatch instead, and keeps the
//! futures it returns `Send` so a reader can live inside a spawned task.
//!
//! # Examples
//!
//! ```
//! use siac_hardware::devices::AnyReader;
//! use siac_hardware::mock::MockReader;
//! use siac_hardware::traits::PortEnumerator;
//!
//! let (reader, handle) = MockReader::with_endpoints(["COM3"]);
//! let any_reader = AnyReader::Mock(reader);
//!
//! assert_eq!(any_reader.list_endpoints().len(), 1);
//! # drop(handle);
//! ```

use tokio::sync::mpsc;

use crate::Result;
use crate::events::ReaderEvent;
use crate::mock::MockReader;
use crate::traits::{DeviceSessionProvider, PortEnumerator};
use crate::types::DeviceEndpoint;

/// Enum wrapper for reader dispatch.
#[derive(Debug)]
pub enum AnyReader {
    /// Mock reader for development and testing.
    Mock(MockReader),
    // TODO: add a variant for the SI serial protocol driver once it exists;
    // SerialPortEnumerator already covers the enumeration half.
}

impl From<MockReader> for AnyReader {
    fn from(reader: MockReader) -> Self {
        Self::Mock(reader)
    }
}

impl PortEnumerator for AnyReader {
    fn list_endpoints(&self) -> Vec<DeviceEndpoint> {
        match self {
            Self::Mock(reader) => reader.list_endpoints(),
        }
    }

    fn is_endpoint_valid(&self, endpoint: &DeviceEndpoint) -> bool {
        match self {
            Self::Mock(reader) => reader.is_endpoint_valid(endpoint),
        }
    }
}

impl DeviceSessionProvider for AnyReader {
    async fn select_input(&mut self, endpoint: &DeviceEndpoint) -> Result<()> {
        match self {
            Self::Mock(reader) => reader.select_input(endpoint).await,
        }
    }

    async fn open_input(&mut self) -> Result<()> {
        match self {
            Self::Mock(reader) => reader.open_input().await,
        }
    }

    async fn close_input(&mut self) -> Result<()> {
        match self {
            Self::Mock(reader) => reader.close_input().await,
        }
    }

    fn is_input_open(&self) -> bool {
        match self {
            Self::Mock(reader) => reader.is_input_open(),
        }
    }

    fn subscribe(&mut self) -> Option<mpsc::Receiver<ReaderEvent>> {
        match self {
            Self::Mock(reader) => reader.subscribe(),
        }
    }
}
