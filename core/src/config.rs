//! Configuration for port reclamation.
//!
//! Stored as JSON at `~/.portreclaim/config.json`. Values are layered:
//! built-in defaults, then the file, then `PORTRECLAIM_*` environment
//! variables. The CLI applies its flags on top.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::PollPolicy;
use crate::domain::PortNumber;
use crate::error::{Error, Result};
use crate::ports::KillMode;

pub const ENV_PORT: &str = "PORTRECLAIM_PORT";
pub const ENV_HOST: &str = "PORTRECLAIM_HOST";
pub const ENV_POLL_INTERVAL_MS: &str = "PORTRECLAIM_POLL_INTERVAL_MS";
pub const ENV_TIMEOUT_MS: &str = "PORTRECLAIM_TIMEOUT_MS";
pub const ENV_GRACEFUL: &str = "PORTRECLAIM_GRACEFUL";
pub const ENV_GRACE_PERIOD_MS: &str = "PORTRECLAIM_GRACE_PERIOD_MS";

/// Reclamation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReclaimConfig {
    /// Port to free and bind.
    #[serde(default = "default_port")]
    pub port: PortNumber,

    /// Address the listener binds to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Delay between presence checks while waiting for the port.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum time to wait for the port after killing its holders.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Send SIGTERM first and only SIGKILL survivors.
    #[serde(default)]
    pub graceful: bool,

    /// Wait between SIGTERM and SIGKILL in graceful mode.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

fn default_port() -> PortNumber {
    PortNumber::DEFAULT
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_grace_period_ms() -> u64 {
    500
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
            graceful: false,
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

impl ReclaimConfig {
    /// Polling policy for `ensure_free`.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    /// Signal strategy for the kill step.
    pub fn kill_mode(&self) -> KillMode {
        if self.graceful {
            KillMode::Graceful {
                grace: Duration::from_millis(self.grace_period_ms),
            }
        } else {
            KillMode::Force
        }
    }

    /// Socket address for the listener.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.get())
    }

    /// Reject settings the reclaimer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("pollIntervalMs must be greater than 0".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeoutMs must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Apply `PORTRECLAIM_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PORT) {
            self.port = value
                .parse()
                .map_err(|e| Error::Config(format!("{}: {}", ENV_PORT, e)))?;
        }
        if let Some(value) = lookup(ENV_HOST) {
            self.host = value
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}: {}", ENV_HOST, e)))?;
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_ms(ENV_POLL_INTERVAL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_ms(ENV_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_GRACEFUL) {
            self.graceful = parse_bool(ENV_GRACEFUL, &value)?;
        }
        if let Some(value) = lookup(ENV_GRACE_PERIOD_MS) {
            self.grace_period_ms = parse_ms(ENV_GRACE_PERIOD_MS, &value)?;
        }
        self.validate()
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{}: '{}' is not a number of milliseconds", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{}: '{}' is not a boolean", key, value))),
    }
}

/// Configuration store.
///
/// Handles reading and writing configuration to `~/.portreclaim/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portreclaim/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".portreclaim").join("config.json"),
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<ReclaimConfig> {
        if !self.config_path.exists() {
            return Ok(ReclaimConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: ReclaimConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file and apply environment overrides.
    pub async fn load_effective(&self) -> Result<ReclaimConfig> {
        let mut config = self.load().await?;
        config.apply_env()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &ReclaimConfig) -> Result<()> {
        config.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).await.map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ReclaimConfig::default();
        assert_eq!(config.port, PortNumber::DEFAULT);
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9009");
        assert_eq!(config.poll_policy(), PollPolicy::default());
        assert_eq!(config.kill_mode(), KillMode::Force);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReclaimConfig = serde_json::from_str(r#"{"port": 3000, "graceful": true}"#).unwrap();
        assert_eq!(config.port.get(), 3000);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(
            config.kill_mode(),
            KillMode::Graceful {
                grace: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ReclaimConfig::default();
        config
            .apply_overrides(env(&[
                (ENV_PORT, "8080"),
                (ENV_HOST, "0.0.0.0"),
                (ENV_TIMEOUT_MS, "250"),
                (ENV_GRACEFUL, "yes"),
            ]))
            .unwrap();

        assert_eq!(config.port.get(), 8080);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.timeout_ms, 250);
        assert!(config.graceful);
        assert_eq!(config.poll_interval_ms, 100);
    }

    #[test]
    fn test_invalid_env_overrides() {
        let mut config = ReclaimConfig::default();
        assert!(config.apply_overrides(env(&[(ENV_PORT, "0")])).is_err());
        assert!(config.apply_overrides(env(&[(ENV_PORT, "99999")])).is_err());
        assert!(config.apply_overrides(env(&[(ENV_TIMEOUT_MS, "soon")])).is_err());
        assert!(config.apply_overrides(env(&[(ENV_GRACEFUL, "maybe")])).is_err());
        assert!(matches!(
            config.apply_overrides(env(&[(ENV_POLL_INTERVAL_MS, "0")])),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.json"));

        assert_eq!(store.load().await.unwrap(), ReclaimConfig::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_path(dir.path().join("nested").join("config.json"));

        let config = ReclaimConfig {
            port: PortNumber::new(4000).unwrap(),
            timeout_ms: 1500,
            ..Default::default()
        };
        store.save(&config).await.unwrap();

        assert_eq!(store.load().await.unwrap(), config);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_rejects_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"port": 0}"#).unwrap();

        let store = ConfigStore::with_path(path);
        assert!(matches!(store.load().await, Err(Error::Config(_))));
    }
}
