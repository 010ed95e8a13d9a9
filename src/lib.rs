//! netpulse: live traffic capture, CPU sampling and TCP port scanning behind a JSON API.
//!
//! Capture workers (one per interface) append decoded packet metadata to a
//! shared [`traffic::CaptureRegistry`]; a sampler keeps recent CPU usage in a
//! [`services::metrics::CpuHistory`]; [`scanner::PortScanner`] runs
//! connect-scans on demand. [`api::router`] exposes all of it over HTTP.
pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod scanner;
pub mod services;
pub mod traffic;

pub use config::Config;
pub use error::{ApiError, CaptureError, ConfigError, DecodeError, MetricsError, ScanError};
pub use scanner::{PortScanner, PortSet, ScanRequest, ScanResult};
pub use services::supervisor::Supervisor;
pub use traffic::{CaptureRegistry, PacketRecord};
