//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the capabilities the reclaimer needs from the host
//! operating system. Implementations live in `adapters`; tests substitute
//! fake process tables.

mod inspector;
mod terminator;

pub use inspector::PortInspector;
pub use terminator::{KillMode, ProcessTerminator};
