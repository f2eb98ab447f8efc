//! Common types shared across reading device implementations.
//!
//! This module defines endpoints produced by enumeration, the hardware
//! state of an open device, and the station configuration a master station
//! reports after attach.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport an endpoint is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    /// Serial port, including USB serial bridges.
    Serial,

    /// USB HID device.
    UsbHid,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "Serial"),
            Self::UsbHid => write!(f, "USB HID"),
        }
    }
}

/// A candidate reading device produced by one enumeration pass.
///
/// The `id` is the position in the enumeration and is only meaningful
/// within that pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEndpoint {
    /// Position in the enumeration pass.
    pub id: usize,

    /// System device name (e.g., "/dev/ttyUSB0", "COM3").
    pub device_name: String,

    /// Human-readable name shown to the operator.
    pub display_name: String,

    /// Transport kind.
    pub kind: EndpointKind,
}

impl DeviceEndpoint {
    /// Create a serial endpoint whose display name equals its device name.
    pub fn serial(id: usize, device_name: impl Into<String>) -> Self {
        let device_name = device_name.into();
        Self {
            id,
            display_name: device_name.clone(),
            device_name,
            kind: EndpointKind::Serial,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the transport kind.
    pub fn with_kind(mut self, kind: EndpointKind) -> Self {
        self.kind = kind;
        self
    }

    /// Return a copy with a new enumeration id.
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }
}

impl fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.device_name)
    }
}

/// Hardware state of the open input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Offline,
    Online,
    Busy,
    ErrorState,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => write!(f, "Offline"),
            Self::Online => write!(f, "Online"),
            Self::Busy => write!(f, "Busy"),
            Self::ErrorState => write!(f, "Error"),
        }
    }
}

/// Kind of device the reader is using as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReaderDeviceType {
    /// No device.
    None,

    /// An SI reading station.
    SiDevice,
}

impl fmt::Display for ReaderDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::SiDevice => write!(f, "SiDevice"),
        }
    }
}

/// Current input device of the reader, reported when it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub device_type: ReaderDeviceType,
    pub endpoint: Option<DeviceEndpoint>,
}

impl DeviceDescriptor {
    /// Descriptor of an SI device attached through `endpoint`.
    pub fn si_device(endpoint: DeviceEndpoint) -> Self {
        Self {
            device_type: ReaderDeviceType::SiDevice,
            endpoint: Some(endpoint),
        }
    }

    /// Descriptor for "no input device".
    pub fn none() -> Self {
        Self {
            device_type: ReaderDeviceType::None,
            endpoint: None,
        }
    }

    /// Name of the input source as shown to the operator.
    ///
    /// SI devices are named after their endpoint; anything else after the
    /// device type.
    pub fn source_name(&self) -> String {
        match (&self.device_type, &self.endpoint) {
            (ReaderDeviceType::SiDevice, Some(endpoint)) => endpoint.display_name.clone(),
            (device_type, _) => device_type.to_string(),
        }
    }
}

/// Product family of an SI station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductFamily {
    /// SRR radio dongle.
    SimSrr,

    /// BSM8 master station.
    Bs8SiMaster,

    /// BSx7 station.
    Bsx7,

    /// BSx8 station.
    Bsx8,

    /// BS11 large station.
    Bs11,

    /// Any other family.
    Unknown,
}

impl ProductFamily {
    /// Returns `true` for families that can act as readout master stations.
    pub fn is_master_station(self) -> bool {
        matches!(self, Self::Bs8SiMaster | Self::Bsx7 | Self::Bsx8)
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SimSrr => "SimSrr",
            Self::Bs8SiMaster => "Bs8SiMaster",
            Self::Bsx7 => "Bsx7",
            Self::Bsx8 => "Bsx8",
            Self::Bs11 => "Bs11",
            Self::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// Operating mode of an SI station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingMode {
    Control,
    Start,
    Finish,
    Readout,
    Clear,
    Check,
    Printout,
    Unknown,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Control => "Control",
            Self::Start => "Start",
            Self::Finish => "Finish",
            Self::Readout => "Readout",
            Self::Clear => "Clear",
            Self::Check => "Check",
            Self::Printout => "Printout",
            Self::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// Configuration a station reports after it has been attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfiguration {
    pub serial_number: u32,
    pub firmware_version: String,
    pub product_family: ProductFamily,
    /// Product type name within the family (e.g., "BSM8-USB").
    pub product_type: String,
    /// Station code number.
    pub code_number: u16,
    pub operating_mode: OperatingMode,
    pub auto_send: bool,
    pub legacy_protocol: bool,
    /// SRR radio channel, for SRR dongles.
    pub sim_srr_channel: Option<u8>,
    /// Whether an SRR dongle uses the ModD3 protocol.
    pub sim_srr_mod_d3: bool,
}

impl StationConfiguration {
    /// Configuration of a master station in readout mode with default flags.
    pub fn master(product_family: ProductFamily, serial_number: u32) -> Self {
        Self {
            serial_number,
            firmware_version: "656".to_string(),
            product_family,
            product_type: product_family.to_string(),
            code_number: 1,
            operating_mode: OperatingMode::Readout,
            auto_send: false,
            legacy_protocol: false,
            sim_srr_channel: None,
            sim_srr_mod_d3: false,
        }
    }

    /// Configuration of an SRR radio dongle listening on `channel`.
    pub fn srr_dongle(serial_number: u32, channel: u8) -> Self {
        Self {
            product_family: ProductFamily::SimSrr,
            product_type: "SRR-Dongle".to_string(),
            sim_srr_channel: Some(channel),
            ..Self::master(ProductFamily::SimSrr, serial_number)
        }
    }

    /// Set the operating mode.
    pub fn with_operating_mode(mut self, operating_mode: OperatingMode) -> Self {
        self.operating_mode = operating_mode;
        self
    }

    /// Set the autosend flag.
    pub fn with_auto_send(mut self, auto_send: bool) -> Self {
        self.auto_send = auto_send;
        self
    }

    /// Set the legacy protocol flag.
    pub fn with_legacy_protocol(mut self, legacy_protocol: bool) -> Self {
        self.legacy_protocol = legacy_protocol;
        self
    }
}

/// Reasons a station configuration could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigurationFailure {
    /// The station's operating mode is not supported.
    OperatingModeNotSupported,

    /// The station has no backup memory.
    DeviceDoesNotHaveBackup,

    /// The station cannot read out its backup memory as a master.
    ReadoutMasterBackupNotSupported,
}

impl ConfigurationFailure {
    /// Explanation shown to the operator.
    pub fn description(self) -> &'static str {
        match self {
            Self::OperatingModeNotSupported => "The operating mode of the station is not supported.",
            Self::DeviceDoesNotHaveBackup => "The station does not have a backup memory.",
            Self::ReadoutMasterBackupNotSupported => {
                "Reading the backup memory of this master station is not supported."
            }
        }
    }
}

impl fmt::Display for ConfigurationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OperatingModeNotSupported => "OperatingModeNotSupported",
            Self::DeviceDoesNotHaveBackup => "DeviceDoesNotHaveBackup",
            Self::ReadoutMasterBackupNotSupported => "ReadoutMasterBackupNotSupported",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of reading a station's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigurationOutcome {
    Read(StationConfiguration),
    Failed(ConfigurationFailure),
}
