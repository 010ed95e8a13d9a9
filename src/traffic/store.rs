use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::history::BoundedHistory;
use crate::traffic::model::{PacketRecord, WorkerState, WorkerStatus};

pub const DEFAULT_PACKET_HISTORY: usize = 100;

/// Recent packets per interface, behind one lock shared by every worker and reader.
pub struct CaptureRegistry {
    capacity: usize,
    histories: Mutex<HashMap<String, BoundedHistory<PacketRecord>>>,
}

impl CaptureRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            histories: Mutex::new(HashMap::new()),
        }
    }

    /// Appends to the interface's history, creating it on first use.
    pub fn append(&self, interface: &str, record: PacketRecord) {
        let mut histories = self.lock();
        match histories.get_mut(interface) {
            Some(history) => {
                history.push(record);
            }
            None => {
                let mut history = BoundedHistory::new(self.capacity);
                history.push(record);
                histories.insert(interface.to_string(), history);
            }
        }
    }

    pub fn snapshot_all(&self) -> BTreeMap<String, Vec<PacketRecord>> {
        let histories = self.lock();
        histories
            .iter()
            .map(|(name, history)| (name.clone(), history.to_vec()))
            .collect()
    }

    /// Empty for an interface that has not captured anything yet.
    pub fn snapshot(&self, interface: &str) -> Vec<PacketRecord> {
        self.lock()
            .get(interface)
            .map(BoundedHistory::to_vec)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Histories hold plain values, so a writer that panicked mid-append cannot
    // leave anything half-built behind.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, BoundedHistory<PacketRecord>>> {
        self.histories.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CaptureRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PACKET_HISTORY)
    }
}

/// Lifecycle state and counters of every capture worker.
#[derive(Default)]
pub struct WorkerBoard {
    workers: Mutex<HashMap<String, WorkerStatus>>,
}

impl WorkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&self, interface: &str, state: WorkerState) {
        self.lock()
            .entry(interface.to_string())
            .or_default()
            .state = state;
    }

    pub fn record_captured(&self, interface: &str) {
        self.lock().entry(interface.to_string()).or_default().captured += 1;
    }

    pub fn record_dropped(&self, interface: &str) {
        self.lock().entry(interface.to_string()).or_default().dropped += 1;
    }

    pub fn get(&self, interface: &str) -> Option<WorkerStatus> {
        self.lock().get(interface).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, WorkerStatus> {
        self.lock()
            .iter()
            .map(|(name, status)| (name.clone(), status.clone()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, WorkerStatus>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
