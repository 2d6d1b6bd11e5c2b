//! Port number domain model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A TCP port a listener may bind to.
///
/// Always in `1..=65535`; port 0 ("any free port") is never a reclamation
/// target because it identifies no endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u16")]
pub struct PortNumber(u16);

impl PortNumber {
    /// Port the bridge listens on when nothing else is configured.
    pub const DEFAULT: Self = Self(9009);

    /// Validate and wrap a raw port value.
    pub fn new(port: u32) -> Result<Self> {
        match u16::try_from(port) {
            Ok(p) if p != 0 => Ok(Self(p)),
            _ => Err(Error::InvalidPort(port)),
        }
    }

    /// The raw port value.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u32> for PortNumber {
    type Error = Error;

    fn try_from(port: u32) -> Result<Self> {
        Self::new(port)
    }
}

impl TryFrom<u16> for PortNumber {
    type Error = Error;

    fn try_from(port: u16) -> Result<Self> {
        Self::new(u32::from(port))
    }
}

impl From<PortNumber> for u16 {
    fn from(port: PortNumber) -> Self {
        port.0
    }
}

impl FromStr for PortNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: u32 = s
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("'{}' is not a port number", s)))?;
        Self::new(raw)
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
