//! Process terminator port (interface).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{TerminationReport, VictimSet};
use crate::error::Result;

/// How victims are signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KillMode {
    /// SIGKILL / `taskkill /F` straight away.
    #[default]
    Force,
    /// SIGTERM, wait `grace`, then SIGKILL whatever is still running.
    Graceful { grace: Duration },
}

/// Port for killing processes.
///
/// Takes a `VictimSet`, which is never empty, so implementations are
/// never asked to run a signal command without arguments.
pub trait ProcessTerminator: Send + Sync {
    /// Signal every victim.
    ///
    /// Per-process failures (permission denied, already exited) belong in
    /// the report. `Err` means the terminator could not run at all.
    fn terminate(
        &self,
        victims: &VictimSet,
        mode: KillMode,
    ) -> impl std::future::Future<Output = Result<TerminationReport>> + Send;
}
