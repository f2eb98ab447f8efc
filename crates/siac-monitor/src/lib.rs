//! SI-card battery monitor.
//!
//! Connects to an SI reading station, classifies the battery of every card
//! read out, shows the verdicts through a [`PresentationSink`] and blanks
//! them again a few seconds later.
//!
//! The crate is UI-agnostic: all output goes through the sink, all input
//! comes from a reader (see `siac_hardware`) and a [`MonitorHandle`].

pub mod auto_clear;
pub mod clock;
pub mod config;
pub mod connection;
pub mod endpoints;
pub mod monitor;
pub mod presentation;

pub use auto_clear::{AutoClearScheduler, ClearDeadline};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::MonitorConfig;
pub use connection::{ConfigurationWarning, ConnectionMachine, ConnectionState, ConnectionTransition};
pub use endpoints::EndpointRegistry;
pub use monitor::{Monitor, MonitorBuilder, MonitorHandle, MonitorSnapshot};
pub use presentation::{ConnectionStatus, Notification, PresentationSink, RecordingSink, Severity};
