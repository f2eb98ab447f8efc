//! Serial port enumeration for SI reading stations.
//!
//! SI master stations attach as USB serial devices built around a Silicon
//! Labs bridge. Only ports carrying that USB vendor id are offered as
//! endpoints.

use serialport::{SerialPortInfo, SerialPortType};
use siac_core::constants::SI_USB_VENDOR_ID;
use tracing::{debug, warn};

use crate::traits::PortEnumerator;
use crate::types::{DeviceEndpoint, EndpointKind};
use crate::{HardwareError, Result};

/// Enumerates SI-compatible serial ports on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortEnumerator;

impl SerialPortEnumerator {
    pub fn new() -> Self {
        Self
    }

    /// Query the host for SI serial ports.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Enumeration`] if the host port list cannot
    /// be read.
    pub fn try_list_endpoints(&self) -> Result<Vec<DeviceEndpoint>> {
        let ports = serialport::available_ports().map_err(enumeration_error)?;
        let endpoints = si_endpoints(ports);
        debug!("Found {} SI serial port(s)", endpoints.len());
        Ok(endpoints)
    }
}

impl PortEnumerator for SerialPortEnumerator {
    fn list_endpoints(&self) -> Vec<DeviceEndpoint> {
        self.try_list_endpoints().unwrap_or_else(|e| {
            warn!("{}", e);
            Vec::new()
        })
    }
}

fn enumeration_error(error: serialport::Error) -> HardwareError {
    HardwareError::enumeration(error.description)
}

/// Keep the SI ports of `ports`, numbered in the order given.
pub fn si_endpoints(ports: Vec<SerialPortInfo>) -> Vec<DeviceEndpoint> {
    ports
        .into_iter()
        .filter_map(|port| match port.port_type {
            SerialPortType::UsbPort(usb) if usb.vid == SI_USB_VENDOR_ID => {
                let display_name = usb.product.unwrap_or_else(|| port.port_name.clone());
                Some((port.port_name, display_name))
            }
            _ => None,
        })
        .enumerate()
        .map(|(id, (device_name, display_name))| {
            DeviceEndpoint::serial(id, device_name)
                .with_display_name(display_name)
                .with_kind(EndpointKind::Serial)
        })
        .collect()
}
