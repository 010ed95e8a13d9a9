use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata extracted from one captured frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketRecord {
    pub interface: String,
    pub src_mac: String,
    pub dst_mac: String,
    pub src_ip: Option<IpAddr>, // None for ARP, LLDP and other non-IP frames
    pub dst_ip: Option<IpAddr>,
    pub protocol: String,
    pub length: u32,
    pub captured_at: DateTime<Utc>,
}

/// One frame as handed over by the capture facility.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub data: Vec<u8>,
    /// Length on the wire, which can exceed `data.len()` when the snapshot was truncated.
    pub wire_len: u32,
}

impl RawFrame {
    pub fn new(data: Vec<u8>) -> Self {
        let wire_len = data.len() as u32;
        Self { data, wire_len }
    }
}

/// Lifecycle of a capture worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Starting,
    Capturing,
    Failed(String),
    Stopped,
}

/// Per-interface worker bookkeeping exposed on `/api/interfaces`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub captured: u64,
    pub dropped: u64,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self {
            state: WorkerState::Starting,
            captured: 0,
            dropped: 0,
        }
    }
}
