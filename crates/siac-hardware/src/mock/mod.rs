//! Mock device implementations for testing and development.
//!
//! This module provides a simulated reading device that can be controlled
//! programmatically without requiring a physical station.

pub mod reader;

// Re-export commonly used types
pub use reader::{MockReader, MockReaderHandle};
