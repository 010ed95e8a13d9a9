use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::scanner::core::{DEFAULT_MAX_WORKERS, DEFAULT_PROBE_TIMEOUT};
use crate::services::metrics::DEFAULT_CPU_HISTORY;
use crate::traffic::store::DEFAULT_PACKET_HISTORY;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    /// Capture only on these interfaces. `None` means every enumerated one.
    pub interfaces: Option<Vec<String>>,
    pub packet_history: usize,
    pub cpu_history: usize,
    pub cpu_interval: Duration,
    pub scan_timeout: Duration,
    pub scan_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            interfaces: None,
            packet_history: DEFAULT_PACKET_HISTORY,
            cpu_history: DEFAULT_CPU_HISTORY,
            cpu_interval: Duration::from_secs(1),
            scan_timeout: DEFAULT_PROBE_TIMEOUT,
            scan_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl Config {
    /// Reads `NETPULSE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            bind: parse_or(get("NETPULSE_BIND"), "NETPULSE_BIND", defaults.bind)?,
            interfaces: get("NETPULSE_INTERFACES").map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            }),
            packet_history: positive(
                get("NETPULSE_PACKET_HISTORY"),
                "NETPULSE_PACKET_HISTORY",
                defaults.packet_history,
            )?,
            cpu_history: positive(
                get("NETPULSE_CPU_HISTORY"),
                "NETPULSE_CPU_HISTORY",
                defaults.cpu_history,
            )?,
            cpu_interval: millis(
                get("NETPULSE_CPU_INTERVAL_MS"),
                "NETPULSE_CPU_INTERVAL_MS",
                defaults.cpu_interval,
            )?,
            scan_timeout: millis(
                get("NETPULSE_SCAN_TIMEOUT_MS"),
                "NETPULSE_SCAN_TIMEOUT_MS",
                defaults.scan_timeout,
            )?,
            scan_workers: positive(
                get("NETPULSE_SCAN_WORKERS"),
                "NETPULSE_SCAN_WORKERS",
                defaults.scan_workers,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn positive(raw: Option<String>, key: &'static str, default: usize) -> Result<usize, ConfigError> {
    let value = parse_or(raw.clone(), key, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: raw.unwrap_or_default(),
        });
    }
    Ok(value)
}

fn millis(raw: Option<String>, key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let ms = positive(raw, key, default.as_millis() as usize)?;
    Ok(Duration::from_millis(ms as u64))
}
