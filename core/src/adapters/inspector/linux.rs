//! Linux port inspector using ss, falling back to lsof.

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::PortNumber;
use crate::error::{Error, Result};
use crate::ports::PortInspector;

use super::lsof::LsofInspector;
use super::parse::{parse_ss_listeners, SsListeners};

/// Linux-specific port inspector.
#[derive(Debug, Clone)]
pub struct LinuxInspector {
    ss: String,
    fallback: LsofInspector,
}

impl LinuxInspector {
    pub fn new() -> Self {
        Self {
            ss: "ss".to_string(),
            fallback: LsofInspector::new(),
        }
    }
}

impl Default for LinuxInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl PortInspector for LinuxInspector {
    async fn pids_on_port(&self, port: PortNumber) -> Result<Vec<u32>> {
        let output = match Command::new(&self.ss)
            .args(["-Htlnp"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(port = port.get(), "ss not found, falling back to lsof");
                return self.fallback.pids_on_port(port).await;
            }
            Err(e) => {
                return Err(Error::query(port.get(), format!("Failed to run ss: {}", e)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::query(
                port.get(),
                format!("ss exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::query(port.get(), format!("Invalid UTF-8 in ss output: {}", e)))?;

        owners(port, parse_ss_listeners(&stdout, port.get()))
    }
}

/// A listener nobody can be blamed for is not a free port.
fn owners(port: PortNumber, listeners: SsListeners) -> Result<Vec<u32>> {
    if !listeners.unattributed {
        return Ok(listeners.pids);
    }
    if listeners.pids.is_empty() {
        return Err(Error::query(
            port.get(),
            "listener owner not visible to ss (insufficient privilege)",
        ));
    }
    warn!(
        port = port.get(),
        visible = ?listeners.pids,
        "Some listeners on port have no visible owner"
    );
    Ok(listeners.pids)
}
