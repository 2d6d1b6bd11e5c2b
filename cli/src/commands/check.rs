//! Check command - show whether a port is taken.

use anyhow::Result;
use portreclaim_core::{PortInspector, PortNumber, PortReclaimer, ReclaimConfig};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortStatus {
    port: PortNumber,
    in_use: bool,
    pids: Vec<u32>,
}

pub async fn run(config: &ReclaimConfig, port: PortNumber, json: bool) -> Result<()> {
    let reclaimer = PortReclaimer::from_config(config);
    let pids = reclaimer.inspector().pids_on_port(port).await?;

    let status = PortStatus {
        port,
        in_use: !pids.is_empty(),
        pids,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    if status.in_use {
        let pids: Vec<String> = status.pids.iter().map(u32::to_string).collect();
        println!("Port {} is in use (PID {})", port, pids.join(", "));
    } else {
        println!("Port {} is free", port);
    }
    Ok(())
}
