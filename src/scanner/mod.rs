pub mod core;
pub mod ports;

use serde::Serialize;

use crate::error::ScanError;

pub use self::core::PortScanner;
pub use self::ports::PortSet;

/// A validated scan: non-empty target plus the ports to probe.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub target: String,
    pub ports: PortSet,
}

impl ScanRequest {
    /// Ports default to 1-1024 when not given.
    pub fn new(target: Option<&str>, ports: Option<PortSet>) -> Result<Self, ScanError> {
        let target = target
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ScanError::MissingTarget)?;

        Ok(Self {
            target: target.to_string(),
            ports: ports.unwrap_or_else(PortSet::well_known),
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScanResult {
    pub target: String,
    pub open_ports: Vec<u16>,
}

impl ScanResult {
    pub fn empty(target: &str) -> Self {
        Self {
            target: target.to_string(),
            open_ports: Vec::new(),
        }
    }
}
