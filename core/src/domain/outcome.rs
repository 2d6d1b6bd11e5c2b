//! Results of termination and reclamation runs.

use serde::Serialize;

use super::PortNumber;

/// What happened to each victim during one termination run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationReport {
    /// PIDs that received the signal.
    pub terminated: Vec<u32>,

    /// PIDs that were gone before the signal landed.
    pub already_exited: Vec<u32>,

    /// PIDs that could not be signalled, with the reason.
    pub failed: Vec<(u32, String)>,
}

impl TerminationReport {
    /// True when every victim is either terminated or already gone.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: TerminationReport) {
        self.terminated.extend(other.terminated);
        self.already_exited.extend(other.already_exited);
        self.failed.extend(other.failed);
    }

    /// Fold in a forced pass over the survivors of a graceful one.
    ///
    /// The forced pass has the last word: a PID it could not kill moves to
    /// `failed`, and one it killed or found gone counts as terminated.
    pub fn apply_forced(&mut self, forced: TerminationReport) {
        let retried: Vec<u32> = forced
            .terminated
            .iter()
            .chain(&forced.already_exited)
            .copied()
            .chain(forced.failed.iter().map(|(pid, _)| *pid))
            .collect();

        self.terminated.retain(|pid| !retried.contains(pid));
        self.failed.retain(|(pid, _)| !retried.contains(pid));

        self.terminated.extend(forced.terminated);
        self.terminated.extend(forced.already_exited);
        self.terminated.sort_unstable();
        self.failed.extend(forced.failed);
    }
}

/// Result of making sure a port is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReclaimOutcome {
    /// Nothing was listening; no process was touched.
    AlreadyFree { port: PortNumber },

    /// Holders were signalled and the port was later observed free.
    #[serde(rename_all = "camelCase")]
    Reclaimed {
        port: PortNumber,
        /// `None` when the holders exited between the check and the kill.
        report: Option<TerminationReport>,
        /// Presence checks performed after the kill.
        checks: u32,
        waited_ms: u64,
    },
}

impl ReclaimOutcome {
    pub fn port(&self) -> PortNumber {
        match self {
            ReclaimOutcome::AlreadyFree { port } | ReclaimOutcome::Reclaimed { port, .. } => *port,
        }
    }

    /// Whether any termination was attempted.
    pub fn killed_anything(&self) -> bool {
        matches!(self, ReclaimOutcome::Reclaimed { report: Some(_), .. })
    }
}
