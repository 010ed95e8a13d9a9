use std::str::FromStr;

use crate::error::ScanError;

/// Validated, sorted and de-duplicated set of TCP ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSet(Vec<u16>);

impl PortSet {
    /// Ports 1-1024, used when a request does not name any.
    pub fn well_known() -> Self {
        PortSet((1..=1024).collect())
    }

    pub fn empty() -> Self {
        PortSet(Vec::new())
    }

    /// Accepts raw integers from a request body, rejecting anything outside 1-65535.
    pub fn from_values(values: &[i64]) -> Result<Self, ScanError> {
        let mut ports = Vec::with_capacity(values.len());
        for &value in values {
            ports.push(to_port(value)?);
        }
        Ok(Self::from_ports(ports))
    }

    fn from_ports(mut ports: Vec<u16>) -> Self {
        ports.sort_unstable();
        ports.dedup();
        PortSet(ports)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }
}

/// Parses `"22,80,443"`, `"1-1000"` or a mix like `"22,8000-8100"`.
impl FromStr for PortSet {
    type Err = ScanError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = || ScanError::InvalidPortSpec(spec.to_string());
        let mut ports = Vec::new();

        for part in spec.split(',').map(str::trim) {
            if part.is_empty() {
                return Err(invalid());
            }
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = to_port(start.trim().parse::<i64>().map_err(|_| invalid())?)?;
                    let end = to_port(end.trim().parse::<i64>().map_err(|_| invalid())?)?;
                    if start > end {
                        return Err(invalid());
                    }
                    ports.extend(start..=end);
                }
                None => ports.push(to_port(part.parse::<i64>().map_err(|_| invalid())?)?),
            }
        }

        Ok(Self::from_ports(ports))
    }
}

fn to_port(value: i64) -> Result<u16, ScanError> {
    match u16::try_from(value) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ScanError::InvalidPort(value)),
    }
}
