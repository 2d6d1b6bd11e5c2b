//! Config command - show or initialise the configuration file.

use anyhow::{bail, Result};
use portreclaim_core::{ConfigStore, ReclaimConfig};

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load_effective().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file:     {}", store.path().display());
    println!("Port:            {}", config.port);
    println!("Host:            {}", config.host);
    println!("Poll interval:   {}ms", config.poll_interval_ms);
    println!("Timeout:         {}ms", config.timeout_ms);
    println!("Graceful kill:   {}", config.graceful);
    println!("Grace period:    {}ms", config.grace_period_ms);
    Ok(())
}

pub async fn init(store: &ConfigStore, force: bool) -> Result<()> {
    if store.path().exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        );
    }

    store.save(&ReclaimConfig::default()).await?;
    println!("Wrote {}", store.path().display());
    Ok(())
}
