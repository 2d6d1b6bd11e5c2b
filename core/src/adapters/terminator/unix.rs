//! Unix process terminator.
//!
//! Delivers signals with `kill(2)` directly instead of spawning `/bin/kill`,
//! one call per victim:
//! - SIGTERM (15): graceful termination request
//! - SIGKILL (9): immediate forced termination

use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::{TerminationReport, VictimSet};
use crate::error::{Error, Result};
use crate::ports::{KillMode, ProcessTerminator};

/// Result of signalling a single process.
#[derive(Debug)]
enum Delivery {
    Delivered,
    Gone,
    Failed(Error),
}

/// Unix process terminator.
#[derive(Debug, Clone, Default)]
pub struct SignalTerminator;

impl SignalTerminator {
    pub fn new() -> Self {
        Self
    }

    fn send(pid: u32, signal: Option<Signal>) -> Delivery {
        let raw = match i32::try_from(pid) {
            Ok(raw) if raw > 0 => raw,
            _ => {
                return Delivery::Failed(Error::KillFailed {
                    pid,
                    reason: "PID out of range".to_string(),
                })
            }
        };

        match kill(Pid::from_raw(raw), signal) {
            Ok(()) => Delivery::Delivered,
            Err(Errno::ESRCH) => Delivery::Gone,
            Err(Errno::EPERM) => Delivery::Failed(Error::PermissionDenied(pid)),
            Err(errno) => Delivery::Failed(Error::KillFailed {
                pid,
                reason: errno.desc().to_string(),
            }),
        }
    }

    fn is_running(pid: u32) -> bool {
        matches!(Self::send(pid, None), Delivery::Delivered)
    }

    fn signal_all(victims: &VictimSet, signal: Signal) -> TerminationReport {
        let mut report = TerminationReport::default();

        for pid in victims {
            debug!(pid = pid, signal = %signal, "Sending signal to process");
            match Self::send(pid, Some(signal)) {
                Delivery::Delivered => report.terminated.push(pid),
                Delivery::Gone => {
                    debug!(pid = pid, "Process already exited");
                    report.already_exited.push(pid);
                }
                Delivery::Failed(e) => {
                    warn!(pid = pid, signal = %signal, error = %e, "Failed to signal process");
                    report.failed.push((pid, e.to_string()));
                }
            }
        }

        report
    }
}

impl ProcessTerminator for SignalTerminator {
    async fn terminate(&self, victims: &VictimSet, mode: KillMode) -> Result<TerminationReport> {
        let grace = match mode {
            KillMode::Force => return Ok(Self::signal_all(victims, Signal::SIGKILL)),
            KillMode::Graceful { grace } => grace,
        };

        let mut report = Self::signal_all(victims, Signal::SIGTERM);
        if report.terminated.is_empty() {
            return Ok(report);
        }

        sleep(grace.max(Duration::from_millis(1))).await;

        let survivors = VictimSet::from_pids(
            report
                .terminated
                .iter()
                .copied()
                .filter(|&pid| Self::is_running(pid)),
            0,
        );

        if let Some(survivors) = survivors {
            debug!(count = survivors.len(), "Processes still running after SIGTERM, sending SIGKILL");
            report.apply_forced(Self::signal_all(&survivors, Signal::SIGKILL));
        }

        Ok(report)
    }
}
