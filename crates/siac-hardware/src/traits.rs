//! Reading device trait definitions.
//!
//! This module defines the contract between the battery monitor and the
//! software that talks to an SI reading station. The monitor never touches
//! the transport itself: it enumerates endpoints, asks the provider to open
//! one, and consumes the events the provider emits.
//!
//! All async methods use native `async fn` in traits (Rust 1.90 + Edition
//! 2024 RPITIT), eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use tokio::sync::mpsc;

use crate::error::Result;
use crate::events::ReaderEvent;
use crate::types::DeviceEndpoint;

/// Lists candidate reading device endpoints.
///
/// Enumeration is a read-only query and never fails: when the system has
/// no suitable endpoint, or the query itself fails, the result is an empty
/// list.
///
/// # Examples
///
/// ```
/// use siac_hardware::mock::MockReader;
/// use siac_hardware::traits::PortEnumerator;
/// use siac_hardware::types::DeviceEndpoint;
///
/// let (reader, handle) = MockReader::new();
/// handle.set_endpoints(vec![DeviceEndpoint::serial(0, "COM3")]);
///
/// let endpoints = reader.list_endpoints();
/// assert_eq!(endpoints.len(), 1);
/// assert!(reader.is_endpoint_valid(&endpoints[0]));
/// ```
pub trait PortEnumerator: Send + Sync {
    /// List SI-compatible endpoints in the order the transport reports them.
    ///
    /// Endpoint ids are assigned `0..n` in that order.
    fn list_endpoints(&self) -> Vec<DeviceEndpoint>;

    /// Check whether an endpoint can be used as an input device.
    ///
    /// The default accepts any endpoint with a non-blank device name.
    fn is_endpoint_valid(&self, endpoint: &DeviceEndpoint) -> bool {
        !endpoint.device_name.trim().is_empty()
    }
}

/// Owner of the connection to an SI reading station.
///
/// Opening a session is a two-step operation: [`select_input`] constructs
/// the session for an endpoint, [`open_input`] opens it. At most one input
/// device is open at a time.
///
/// Events are delivered through a single receiver obtained once with
/// [`subscribe`]; the receiver outlives individual sessions.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic parameters, or the enum wrapper in
/// [`devices`](crate::devices) for runtime selection.
///
/// # Examples
///
/// ```
/// use siac_hardware::mock::MockReader;
/// use siac_hardware::traits::{DeviceSessionProvider, PortEnumerator};
/// use siac_hardware::types::DeviceEndpoint;
///
/// #[tokio::main]
/// async fn main() -> siac_hardware::Result<()> {
///     let (mut reader, handle) = MockReader::new();
///     handle.set_endpoints(vec![DeviceEndpoint::serial(0, "/dev/ttyUSB0")]);
///     let mut events = reader.subscribe().expect("first subscription");
///
///     let endpoint = reader.list_endpoints().remove(0);
///     reader.select_input(&endpoint).await?;
///     reader.open_input().await?;
///     assert!(reader.is_input_open());
///
///     // The device reports itself as soon as it is selected.
///     assert!(events.recv().await.is_some());
///
///     reader.close_input().await?;
///     Ok(())
/// }
/// ```
///
/// [`select_input`]: DeviceSessionProvider::select_input
/// [`open_input`]: DeviceSessionProvider::open_input
/// [`subscribe`]: DeviceSessionProvider::subscribe
pub trait DeviceSessionProvider: PortEnumerator {
    /// Construct the session for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::ConstructionFailed`](crate::HardwareError::ConstructionFailed)
    /// if the endpoint cannot be used as an input device.
    async fn select_input(&mut self, endpoint: &DeviceEndpoint) -> Result<()>;

    /// Open the selected input device.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::OpenFailed`](crate::HardwareError::OpenFailed)
    /// if the device cannot be opened, or
    /// [`HardwareError::NotOpen`](crate::HardwareError::NotOpen) if no
    /// input has been selected.
    async fn open_input(&mut self) -> Result<()>;

    /// Close the input device.
    ///
    /// Closing when nothing is open succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport reports a failure while closing.
    async fn close_input(&mut self) -> Result<()>;

    /// Whether an input device is currently open.
    fn is_input_open(&self) -> bool;

    /// Take the event receiver.
    ///
    /// Returns `Some` exactly once; later calls return `None`.
    fn subscribe(&mut self) -> Option<mpsc::Receiver<ReaderEvent>>;
}
