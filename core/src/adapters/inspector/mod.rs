//! Port inspector adapters.
//!
//! Platform-specific implementations of the process-by-port lookup.

#[cfg(unix)]
mod lsof;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod windows;

pub mod parse;

#[cfg(unix)]
pub use lsof::LsofInspector;

use crate::domain::PortNumber;
use crate::error::Result;
use crate::ports::PortInspector;

/// The inspector for the current platform.
///
/// - Linux: `ss`, falling back to `lsof`
/// - macOS and other Unix: `lsof`
/// - Windows: `netstat`
#[derive(Debug, Clone, Default)]
pub struct PlatformInspector {
    #[cfg(target_os = "linux")]
    inner: linux::LinuxInspector,

    #[cfg(all(unix, not(target_os = "linux")))]
    inner: lsof::LsofInspector,

    #[cfg(target_os = "windows")]
    inner: windows::WindowsInspector,
}

impl PlatformInspector {
    /// Create an inspector for the current platform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortInspector for PlatformInspector {
    #[cfg(any(unix, windows))]
    async fn pids_on_port(&self, port: PortNumber) -> Result<Vec<u32>> {
        self.inner.pids_on_port(port).await
    }

    #[cfg(not(any(unix, windows)))]
    async fn pids_on_port(&self, _port: PortNumber) -> Result<Vec<u32>> {
        Err(crate::error::Error::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
