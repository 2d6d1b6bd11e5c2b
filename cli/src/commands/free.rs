//! Free command - kill whatever listens on a port, without waiting.

use anyhow::Result;
use portreclaim_core::{PortNumber, PortReclaimer, ReclaimConfig};

pub async fn run(config: &ReclaimConfig, port: PortNumber, json: bool) -> Result<()> {
    let reclaimer = PortReclaimer::from_config(config);
    let report = reclaimer.kill_process_on_port(port).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report {
        None => println!("No process listening on port {}", port),
        Some(report) => {
            println!("Port {}:", port);
            super::print_report(&report);
        }
    }
    Ok(())
}
