//! Error types for the portreclaim-core library.

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias for portreclaim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while inspecting, reclaiming or binding a port.
#[derive(Error, Debug)]
pub enum Error {
    /// Port number outside 1..=65535.
    #[error("Invalid port number: {0}")]
    InvalidPort(u32),

    /// Inspecting the process table for a port failed.
    #[error("Failed to query port {port}: {reason}")]
    QueryFailed { port: u16, reason: String },

    /// Failed to kill a process.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// Not allowed to signal the process.
    #[error("Permission denied to kill process {0}")]
    PermissionDenied(u32),

    /// The port was still occupied when the wait deadline passed.
    #[error("Port {port} still in use after {waited_ms}ms")]
    Timeout { port: u16, waited_ms: u64 },

    /// The only process holding the port is this one.
    #[error("Port {0} is held by the current process")]
    HeldByCurrentProcess(u16),

    /// Binding the listener failed after reclamation.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    pub(crate) fn query(port: u16, reason: impl Into<String>) -> Self {
        Error::QueryFailed {
            port,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::QueryFailed {
            port: 9009,
            reason: "lsof not found".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to query port 9009: lsof not found");

        let err = Error::Timeout {
            port: 9009,
            waited_ms: 5000,
        };
        assert!(err.to_string().contains("5000ms"));

        let err = Error::PermissionDenied(1234);
        assert!(err.to_string().contains("1234"));
    }
}
