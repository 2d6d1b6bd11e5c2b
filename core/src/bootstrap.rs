//! Server start path: reclaim the port, then bind the listener.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::application::PortReclaimer;
use crate::domain::{PortNumber, ReclaimOutcome};
use crate::error::{Error, Result};
use crate::ports::{PortInspector, ProcessTerminator};

/// Free `addr`'s port and bind a listener on it.
///
/// A failed presence check or a port that never frees stops the bind; the
/// error is logged here and returned to the caller.
pub async fn bind_reclaimed<I, T>(
    reclaimer: &PortReclaimer<I, T>,
    addr: SocketAddr,
) -> Result<(TcpListener, ReclaimOutcome)>
where
    I: PortInspector,
    T: ProcessTerminator,
{
    let port = PortNumber::try_from(addr.port())?;

    let outcome = match reclaimer.ensure_free(port).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(port = port.get(), error = %e, "Could not free port, not binding");
            return Err(e);
        }
    };

    if outcome.killed_anything() {
        info!(port = port.get(), "Reclaimed port from stale process");
    }

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })?;

    info!(addr = %addr, "Listening");
    Ok((listener, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TerminationReport, VictimSet};
    use crate::ports::KillMode;

    struct StaticTable(std::result::Result<Vec<u32>, ()>);

    impl PortInspector for StaticTable {
        async fn pids_on_port(&self, port: PortNumber) -> Result<Vec<u32>> {
            self.0
                .clone()
                .map_err(|_| Error::query(port.get(), "inspector unavailable"))
        }
    }

    impl ProcessTerminator for StaticTable {
        async fn terminate(&self, _victims: &VictimSet, _mode: KillMode) -> Result<TerminationReport> {
            panic!("terminator must not be called");
        }
    }

    fn reclaimer(answer: std::result::Result<Vec<u32>, ()>) -> PortReclaimer<StaticTable, StaticTable> {
        PortReclaimer::new(StaticTable(answer.clone()), StaticTable(answer))
    }

    fn unused_addr() -> SocketAddr {
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap()
    }

    #[tokio::test]
    async fn test_binds_free_port() {
        let addr = unused_addr();
        let (listener, outcome) = bind_reclaimed(&reclaimer(Ok(vec![])), addr).await.unwrap();

        assert_eq!(listener.local_addr().unwrap(), addr);
        assert!(matches!(outcome, ReclaimOutcome::AlreadyFree { .. }));
    }

    #[tokio::test]
    async fn test_query_failure_prevents_bind() {
        let addr = unused_addr();
        let result = bind_reclaimed(&reclaimer(Err(())), addr).await;

        assert!(matches!(result, Err(Error::QueryFailed { .. })));
    }

    #[tokio::test]
    async fn test_bind_error_reported() {
        // Held by an in-process socket the inspector does not see.
        let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = holder.local_addr().unwrap();

        match bind_reclaimed(&reclaimer(Ok(vec![])), addr).await {
            Err(Error::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
            other => panic!("expected bind error, got {:?}", other.map(|(_, o)| o)),
        }
    }

    #[tokio::test]
    async fn test_port_zero_rejected() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let result = bind_reclaimed(&reclaimer(Ok(vec![])), addr).await;

        assert!(matches!(result, Err(Error::InvalidPort(0))));
    }
}
