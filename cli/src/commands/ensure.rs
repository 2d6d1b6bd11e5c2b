//! Ensure command - free a port and wait for it to be released.

use anyhow::Result;
use portreclaim_core::{PortReclaimer, ReclaimConfig, ReclaimOutcome};

pub async fn run(config: &ReclaimConfig, json: bool) -> Result<()> {
    let reclaimer = PortReclaimer::from_config(config);
    let outcome = reclaimer.ensure_free(config.port).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        ReclaimOutcome::AlreadyFree { port } => println!("Port {} is free", port),
        ReclaimOutcome::Reclaimed {
            port,
            report,
            waited_ms,
            ..
        } => {
            println!("Port {} reclaimed after {}ms", port, waited_ms);
            match report {
                Some(report) => super::print_report(&report),
                None => println!("  holders exited on their own"),
            }
        }
    }
    Ok(())
}
