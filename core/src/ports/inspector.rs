//! Port inspector port (interface).

use crate::domain::PortNumber;
use crate::error::Result;

/// Port for looking up which processes listen on a TCP port.
///
/// Implementations handle platform-specific details (lsof, ss, netstat).
pub trait PortInspector: Send + Sync {
    /// PIDs of processes listening on `port`.
    ///
    /// An unbound port yields `Ok(vec![])`. `Err` is reserved for a failed
    /// query (utility missing, unexpected exit status, unreadable output).
    fn pids_on_port(
        &self,
        port: PortNumber,
    ) -> impl std::future::Future<Output = Result<Vec<u32>>> + Send;
}
