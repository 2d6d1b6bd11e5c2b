//! PortReclaim Core Library
//!
//! Frees a TCP port held by a stale process before a listener binds to it.
//! Provides functionality to:
//! - Check whether any process is listening on a port
//! - Kill the processes holding a port (forcefully or gracefully)
//! - Wait, with a deadline, until the port is released
//! - Bind a listener once the port is free
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: Uses `ss`, falling back to `lsof`; signals via `kill(2)`
//! - macOS: Uses `lsof`; signals via `kill(2)`
//! - Windows: Uses `netstat` and `taskkill`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod bootstrap;
pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{PortNumber, ReclaimOutcome, TerminationReport, VictimSet};

// Re-export other commonly used types
pub use adapters::{PlatformInspector, PlatformTerminator};
pub use application::{PollPolicy, PortReclaimer};
pub use bootstrap::bind_reclaimed;
pub use config::{ConfigStore, ReclaimConfig};
pub use error::{Error, Result};
pub use ports::{KillMode, PortInspector, ProcessTerminator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
