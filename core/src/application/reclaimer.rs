//! Port reclamation service.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::adapters::{PlatformInspector, PlatformTerminator};
use crate::config::ReclaimConfig;
use crate::domain::{PortNumber, ReclaimOutcome, TerminationReport, VictimSet};
use crate::error::{Error, Result};
use crate::ports::{KillMode, PortInspector, ProcessTerminator};

/// How long to wait for a port to be released after its holders are killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between presence checks.
    pub interval: Duration,
    /// Give up once this much time has passed since the kill.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Holders of a port, as seen by the kill step.
enum Holders {
    None,
    OnlySelf,
    Victims(VictimSet),
}

/// Frees a TCP port before a listener binds to it.
///
/// The inspector and terminator are injected so tests can run against a
/// fake process table.
pub struct PortReclaimer<I: PortInspector, T: ProcessTerminator> {
    inspector: I,
    terminator: T,
    policy: PollPolicy,
    kill_mode: KillMode,
    own_pid: u32,
}

impl PortReclaimer<PlatformInspector, PlatformTerminator> {
    /// Reclaimer backed by the host OS, with default policy.
    pub fn platform() -> Self {
        Self::new(PlatformInspector::new(), PlatformTerminator::new())
    }

    /// Reclaimer backed by the host OS, tuned by `config`.
    pub fn from_config(config: &ReclaimConfig) -> Self {
        Self::platform().with_config(config)
    }
}

impl<I: PortInspector, T: ProcessTerminator> PortReclaimer<I, T> {
    pub fn new(inspector: I, terminator: T) -> Self {
        Self {
            inspector,
            terminator,
            policy: PollPolicy::default(),
            kill_mode: KillMode::default(),
            own_pid: std::process::id(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_kill_mode(mut self, kill_mode: KillMode) -> Self {
        self.kill_mode = kill_mode;
        self
    }

    /// Apply the poll policy and kill mode from `config`.
    pub fn with_config(self, config: &ReclaimConfig) -> Self {
        self.with_policy(config.poll_policy())
            .with_kill_mode(config.kill_mode())
    }

    pub fn kill_mode(&self) -> KillMode {
        self.kill_mode
    }

    /// Treat `pid` as the current process: it is never killed.
    pub fn with_own_pid(mut self, pid: u32) -> Self {
        self.own_pid = pid;
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn inspector(&self) -> &I {
        &self.inspector
    }

    pub fn terminator(&self) -> &T {
        &self.terminator
    }

    /// Whether any process is listening on `port`.
    ///
    /// An unbound port is `Ok(false)`; only a failed query is an error.
    pub async fn is_port_in_use(&self, port: PortNumber) -> Result<bool> {
        let pids = self.inspector.pids_on_port(port).await?;
        debug!(port = port.get(), pids = ?pids, "Presence check");
        Ok(!pids.is_empty())
    }

    async fn holders(&self, port: PortNumber) -> Result<Holders> {
        let pids = self.inspector.pids_on_port(port).await?;
        let held_by_self = pids.contains(&self.own_pid);

        Ok(match VictimSet::from_pids(pids, self.own_pid) {
            Some(victims) => Holders::Victims(victims),
            None if held_by_self => Holders::OnlySelf,
            None => Holders::None,
        })
    }

    /// Kill every process listening on `port`.
    ///
    /// Returns `Ok(None)` without touching the terminator when there is
    /// nothing to kill. Failures to signal individual processes are logged
    /// and listed in the report.
    pub async fn kill_process_on_port(&self, port: PortNumber) -> Result<Option<TerminationReport>> {
        let victims = match self.holders(port).await? {
            Holders::Victims(victims) => victims,
            Holders::OnlySelf => {
                warn!(port = port.get(), "Port is held by this process, not killing it");
                return Ok(None);
            }
            Holders::None => {
                debug!(port = port.get(), "No process on port, nothing to kill");
                return Ok(None);
            }
        };

        Ok(Some(self.terminate(port, &victims).await?))
    }

    async fn terminate(&self, port: PortNumber, victims: &VictimSet) -> Result<TerminationReport> {
        info!(
            port = port.get(),
            pids = ?victims.iter().collect::<Vec<_>>(),
            mode = ?self.kill_mode,
            "Killing processes on port"
        );

        let report = self.terminator.terminate(victims, self.kill_mode).await?;
        for (pid, reason) in &report.failed {
            warn!(port = port.get(), pid = pid, reason = %reason, "Could not kill process");
        }
        Ok(report)
    }

    /// Make sure nothing is listening on `port`.
    ///
    /// Returns immediately if the port is free. Otherwise kills the holders
    /// and re-checks every `policy.interval` until the port is released or
    /// `policy.timeout` passes.
    pub async fn ensure_free(&self, port: PortNumber) -> Result<ReclaimOutcome> {
        let in_use = self.is_port_in_use(port).await.inspect_err(|e| {
            warn!(port = port.get(), error = %e, "Presence check failed");
        })?;
        if !in_use {
            debug!(port = port.get(), "Port already free");
            return Ok(ReclaimOutcome::AlreadyFree { port });
        }

        let report = match self.holders(port).await {
            Ok(Holders::Victims(victims)) => match self.terminate(port, &victims).await {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(port = port.get(), error = %e, "Kill step failed, re-checking port");
                    None
                }
            },
            Ok(Holders::OnlySelf) => return Err(Error::HeldByCurrentProcess(port.get())),
            Ok(Holders::None) => {
                debug!(port = port.get(), "Holders exited before the kill step");
                None
            }
            Err(e) => {
                warn!(port = port.get(), error = %e, "Failed to enumerate holders, re-checking port");
                None
            }
        };

        let started = Instant::now();
        let mut checks = 0u32;

        loop {
            checks += 1;
            match self.holders(port).await {
                Ok(Holders::None) => {
                    let waited_ms = started.elapsed().as_millis() as u64;
                    info!(port = port.get(), checks = checks, waited_ms = waited_ms, "Port reclaimed");
                    return Ok(ReclaimOutcome::Reclaimed {
                        port,
                        report,
                        checks,
                        waited_ms,
                    });
                }
                // Another holder is gone but this process still listens here.
                Ok(Holders::OnlySelf) => {
                    warn!(port = port.get(), attempt = checks, "Only this process still holds the port");
                    return Err(Error::HeldByCurrentProcess(port.get()));
                }
                Ok(Holders::Victims(_)) => debug!(port = port.get(), attempt = checks, "Port still in use"),
                Err(e) => warn!(port = port.get(), attempt = checks, error = %e, "Re-check failed"),
            }

            let waited = started.elapsed();
            if waited >= self.policy.timeout {
                warn!(port = port.get(), checks = checks, "Gave up waiting for port");
                return Err(Error::Timeout {
                    port: port.get(),
                    waited_ms: waited.as_millis() as u64,
                });
            }

            sleep(self.policy.interval.min(self.policy.timeout - waited)).await;
        }
    }
}
