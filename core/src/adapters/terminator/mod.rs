//! Process terminator adapters.

#[cfg(unix)]
mod unix;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(unix)]
pub use unix::SignalTerminator;

#[cfg(target_os = "windows")]
pub use windows::TaskkillTerminator;

use crate::domain::{TerminationReport, VictimSet};
use crate::error::Result;
use crate::ports::{KillMode, ProcessTerminator};

/// The terminator for the current platform.
#[derive(Debug, Clone, Default)]
pub struct PlatformTerminator {
    #[cfg(unix)]
    inner: unix::SignalTerminator,

    #[cfg(target_os = "windows")]
    inner: windows::TaskkillTerminator,
}

impl PlatformTerminator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessTerminator for PlatformTerminator {
    #[cfg(any(unix, windows))]
    async fn terminate(&self, victims: &VictimSet, mode: KillMode) -> Result<TerminationReport> {
        self.inner.terminate(victims, mode).await
    }

    #[cfg(not(any(unix, windows)))]
    async fn terminate(&self, _victims: &VictimSet, _mode: KillMode) -> Result<TerminationReport> {
        Err(crate::error::Error::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
