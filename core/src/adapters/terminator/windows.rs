//! Windows process terminator.
//!
//! Uses the taskkill utility, one invocation per victim:
//! - `taskkill /PID xxx`: request graceful termination (sends WM_CLOSE)
//! - `taskkill /PID xxx /F`: force termination (TerminateProcess)

use tokio::process::Command;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::adapters::inspector::parse::parse_tasklist_has_pid;
use crate::domain::{TerminationReport, VictimSet};
use crate::error::{Error, Result};
use crate::ports::{KillMode, ProcessTerminator};

#[derive(Debug)]
enum Delivery {
    Delivered,
    Gone,
    Failed(Error),
}

/// Windows process terminator.
#[derive(Debug, Clone, Default)]
pub struct TaskkillTerminator;

impl TaskkillTerminator {
    pub fn new() -> Self {
        Self
    }

    async fn taskkill(pid: u32, force: bool) -> Result<Delivery> {
        debug!(pid = pid, force = force, "Executing taskkill");

        let mut cmd = Command::new("taskkill");
        cmd.arg("/PID").arg(pid.to_string());
        if force {
            cmd.arg("/F");
        }

        let output = cmd.output().await?;
        if output.status.success() {
            return Ok(Delivery::Delivered);
        }

        let combined = format!(
            "{} {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if combined.contains("not found")
            || combined.contains("could not be found")
            || combined.contains("already been terminated")
        {
            return Ok(Delivery::Gone);
        }

        if combined.contains("Access is denied") || combined.contains("access denied") {
            return Ok(Delivery::Failed(Error::PermissionDenied(pid)));
        }

        Ok(Delivery::Failed(Error::KillFailed {
            pid,
            reason: combined.trim().to_string(),
        }))
    }

    async fn is_running(pid: u32) -> bool {
        let filter = format!("PID eq {}", pid);
        match Command::new("tasklist")
            .args(["/FI", filter.as_str(), "/NH", "/FO", "CSV"])
            .output()
            .await
        {
            Ok(output) => parse_tasklist_has_pid(&String::from_utf8_lossy(&output.stdout), pid),
            Err(e) => {
                warn!(pid = pid, error = %e, "Failed to check if process is running");
                false
            }
        }
    }

    async fn kill_all(victims: &VictimSet, force: bool) -> Result<TerminationReport> {
        let mut report = TerminationReport::default();

        for pid in victims {
            match Self::taskkill(pid, force).await? {
                Delivery::Delivered => report.terminated.push(pid),
                Delivery::Gone => report.already_exited.push(pid),
                Delivery::Failed(e) => {
                    warn!(pid = pid, error = %e, "taskkill failed");
                    report.failed.push((pid, e.to_string()));
                }
            }
        }

        Ok(report)
    }
}

impl ProcessTerminator for TaskkillTerminator {
    async fn terminate(&self, victims: &VictimSet, mode: KillMode) -> Result<TerminationReport> {
        let grace = match mode {
            KillMode::Force => return Self::kill_all(victims, true).await,
            KillMode::Graceful { grace } => grace,
        };

        let mut report = Self::kill_all(victims, false).await?;
        // Console apps often ignore WM_CLOSE; anything that failed gets /F next.
        let pending: Vec<u32> = report
            .terminated
            .iter()
            .chain(report.failed.iter().map(|(pid, _)| pid))
            .copied()
            .collect();

        sleep(grace).await;

        let mut survivors = Vec::new();
        for pid in pending {
            if Self::is_running(pid).await {
                survivors.push(pid);
            }
        }

        if let Some(survivors) = VictimSet::from_pids(survivors, 0) {
            report.apply_forced(Self::kill_all(&survivors, true).await?);
        }

        Ok(report)
    }
}
