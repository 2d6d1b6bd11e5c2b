//! Serve command - reclaim the port, then hold a listener on it.

use anyhow::{Context, Result};
use portreclaim_core::{bind_reclaimed, PortReclaimer, ReclaimConfig};
use tracing::{info, warn};

pub async fn run(config: &ReclaimConfig) -> Result<()> {
    let reclaimer = PortReclaimer::from_config(config);
    let addr = config.bind_addr();

    let (listener, _) = bind_reclaimed(&reclaimer, addr)
        .await
        .with_context(|| format!("failed to start listener on {}", addr))?;

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((_stream, peer)) => info!(peer = %peer, "Accepted connection"),
                Err(e) => warn!(error = %e, "Accept failed"),
            },
            _ = tokio::signal::ctrl_c() => {
                info!(addr = %addr, "Shutting down");
                break;
            }
        }
    }

    Ok(())
}
