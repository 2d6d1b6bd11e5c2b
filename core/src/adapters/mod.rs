//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter talks to the host operating system.

pub mod inspector;
pub mod terminator;

// Re-export main types for convenience
pub use inspector::PlatformInspector;
pub use terminator::PlatformTerminator;
