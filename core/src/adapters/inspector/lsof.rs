//! Port inspector using `lsof`.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::domain::PortNumber;
use crate::error::{Error, Result};
use crate::ports::PortInspector;

use super::parse::parse_lsof_pids;

#[cfg(target_os = "macos")]
const DEFAULT_LSOF: &str = "/usr/sbin/lsof";

#[cfg(not(target_os = "macos"))]
const DEFAULT_LSOF: &str = "lsof";

/// Looks up listeners with `lsof -nP -t -iTCP:<port> -sTCP:LISTEN`.
///
/// Flags:
/// - -n / -P: no host or service name resolution
/// - -t: terse output (PIDs only)
/// - -sTCP:LISTEN: listening sockets only, not clients connected to the port
#[derive(Debug, Clone)]
pub struct LsofInspector {
    program: String,
}

impl LsofInspector {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_LSOF)
    }

    /// Use a specific `lsof` binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for LsofInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl PortInspector for LsofInspector {
    async fn pids_on_port(&self, port: PortNumber) -> Result<Vec<u32>> {
        let output = Command::new(&self.program)
            .args(["-nP", "-t"])
            .arg(format!("-iTCP:{}", port))
            .arg("-sTCP:LISTEN")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::query(port.get(), format!("Failed to run {}: {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if output.status.success() {
            return Ok(parse_lsof_pids(&stdout));
        }

        // lsof exits 1 when nothing matches, which is not an error
        if output.status.code() == Some(1) && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                debug!(port = port.get(), stderr = %stderr.trim(), "lsof reported warnings");
            }
            return Ok(Vec::new());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::query(
            port.get(),
            format!("lsof exited with {}: {}", output.status, stderr.trim()),
        ))
    }
}
