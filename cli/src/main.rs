//! PortReclaim CLI - Free TCP ports held by stale processes
//!
//! A command-line tool for checking who holds a port, killing the holders,
//! and starting a listener once the port is free.

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use portreclaim_core::{ConfigStore, PortNumber, ReclaimConfig};

use logging::LogFormat;

#[derive(Parser)]
#[command(name = "portreclaim")]
#[command(author, version, about = "Free TCP ports held by stale processes")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Config file (default: ~/.portreclaim/config.json)
    #[arg(long, global = true, env = "PORTRECLAIM_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether a process is listening on a port
    Check {
        /// Port number to inspect
        port: PortNumber,
    },

    /// Kill every process listening on a port
    #[command(alias = "kill")]
    Free {
        /// Port number to free
        port: PortNumber,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Free a port and wait until it is released
    Ensure {
        /// Port number (default: configured port)
        port: Option<PortNumber>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Free the configured port, then listen on it until Ctrl-C
    Serve {
        /// Port number (default: configured port)
        port: Option<PortNumber>,

        /// Address to bind
        #[arg(long)]
        host: Option<std::net::IpAddr>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags that override the reclaim settings from the config file.
#[derive(Args, Default)]
struct Tuning {
    /// Give up waiting for the port after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Delay between presence checks in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// SIGTERM first, SIGKILL only what survives the grace period
    #[arg(short, long)]
    graceful: bool,

    /// SIGKILL straight away, even if the config asks for graceful
    #[arg(long, conflicts_with = "graceful")]
    force: bool,

    /// Grace period between SIGTERM and SIGKILL in milliseconds
    #[arg(long)]
    grace_ms: Option<u64>,
}

impl Tuning {
    fn apply(&self, config: &mut ReclaimConfig) -> portreclaim_core::Result<()> {
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.poll_interval_ms = interval_ms;
        }
        if self.graceful {
            config.graceful = true;
        }
        if self.force {
            config.graceful = false;
        }
        if let Some(grace_ms) = self.grace_ms {
            config.grace_period_ms = grace_ms;
        }
        config.validate()
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // serve is a long-running process; its lifecycle belongs in the log
    let verbose = match cli.command {
        Commands::Serve { .. } => cli.verbose.max(1),
        _ => cli.verbose,
    };
    logging::init(verbose, cli.log_format);

    let store = match cli.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    };

    match cli.command {
        Commands::Check { port } => {
            let config = store.load_effective().await?;
            commands::check::run(&config, port, cli.json).await?;
        }
        Commands::Free { port, tuning } => {
            let mut config = store.load_effective().await?;
            tuning.apply(&mut config)?;
            commands::free::run(&config, port, cli.json).await?;
        }
        Commands::Ensure { port, tuning } => {
            let mut config = store.load_effective().await?;
            tuning.apply(&mut config)?;
            if let Some(port) = port {
                config.port = port;
            }
            commands::ensure::run(&config, cli.json).await?;
        }
        Commands::Serve { port, host, tuning } => {
            let mut config = store.load_effective().await?;
            tuning.apply(&mut config)?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            commands::serve::run(&config).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&store, cli.json).await?,
            ConfigAction::Init { force } => commands::config::init(&store, force).await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ensure_flags() {
        let cli = Cli::parse_from([
            "portreclaim",
            "ensure",
            "9009",
            "--timeout-ms",
            "250",
            "--graceful",
            "--json",
        ]);
        assert!(cli.json);

        let Commands::Ensure { port, tuning } = cli.command else {
            panic!("expected ensure");
        };
        assert_eq!(port.map(PortNumber::get), Some(9009));

        let mut config = ReclaimConfig::default();
        tuning.apply(&mut config).unwrap();
        assert_eq!(config.timeout_ms, 250);
        assert!(config.graceful);
        assert_eq!(config.poll_interval_ms, 100);
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Cli::try_parse_from(["portreclaim", "check", "0"]).is_err());
        assert!(Cli::try_parse_from(["portreclaim", "free", "70000"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let tuning = Tuning {
            timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(tuning.apply(&mut ReclaimConfig::default()).is_err());
    }

    #[test]
    fn test_force_overrides_graceful_config() {
        let cli = Cli::parse_from(["portreclaim", "free", "9009", "--force"]);
        let Commands::Free { tuning, .. } = cli.command else {
            panic!("expected free");
        };

        let mut config = ReclaimConfig {
            graceful: true,
            ..Default::default()
        };
        tuning.apply(&mut config).unwrap();
        assert!(!config.graceful);
        assert_eq!(config.kill_mode(), portreclaim_core::KillMode::Force);
    }

    #[test]
    fn test_force_conflicts_with_graceful() {
        assert!(Cli::try_parse_from(["portreclaim", "ensure", "--force", "--graceful"]).is_err());
    }
}
