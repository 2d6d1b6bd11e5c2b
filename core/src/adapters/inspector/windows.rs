//! Windows port inspector using netstat.

use std::process::Stdio;

use tokio::process::Command;

use crate::domain::PortNumber;
use crate::error::{Error, Result};
use crate::ports::PortInspector;

use super::parse::parse_netstat_pids;

/// Windows-specific port inspector.
#[derive(Debug, Clone, Default)]
pub struct WindowsInspector;

impl WindowsInspector {
    pub fn new() -> Self {
        Self
    }
}

impl PortInspector for WindowsInspector {
    async fn pids_on_port(&self, port: PortNumber) -> Result<Vec<u32>> {
        let output = Command::new("netstat")
            .args(["-ano"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::query(port.get(), format!("Failed to run netstat: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::query(
                port.get(),
                format!("netstat exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_netstat_pids(&stdout, port.get()))
    }
}
