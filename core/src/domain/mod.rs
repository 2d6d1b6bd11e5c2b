//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod outcome;
mod port;
mod victims;

// Re-export all domain types
pub use outcome::{ReclaimOutcome, TerminationReport};
pub use port::PortNumber;
pub use victims::VictimSet;
