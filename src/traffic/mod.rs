use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub mod decode;
pub mod model;
pub mod source;
pub mod store;

pub use model::{PacketRecord, RawFrame, WorkerState, WorkerStatus};
pub use source::{CaptureFacility, FrameSource, InterfaceEnumerator, NextFrame, PcapBackend};
pub use store::{CaptureRegistry, WorkerBoard};

const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);
/// Consecutive read errors after which the session is given up as dead.
const MAX_READ_ERRORS: u32 = 20;

/// Reads one interface's live capture into the registry until shutdown.
pub struct CaptureWorker {
    interface: String,
    facility: Arc<dyn CaptureFacility>,
    registry: Arc<CaptureRegistry>,
    board: Arc<WorkerBoard>,
    shutdown: CancellationToken,
}

impl CaptureWorker {
    pub fn new(
        interface: impl Into<String>,
        facility: Arc<dyn CaptureFacility>,
        registry: Arc<CaptureRegistry>,
        board: Arc<WorkerBoard>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            interface: interface.into(),
            facility,
            registry,
            board,
            shutdown,
        }
    }

    /// Blocking capture loop. Returns the terminal state the worker ended in.
    pub fn run(self) -> WorkerState {
        let interface = self.interface.as_str();
        self.board.set_state(interface, WorkerState::Starting);

        let mut source = match self.facility.open(interface) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(interface = %interface, "Capture worker failed to start: {}", e);
                let state = WorkerState::Failed(e.to_string());
                self.board.set_state(interface, state.clone());
                return state;
            }
        };

        self.board.set_state(interface, WorkerState::Capturing);
        tracing::info!(interface = %interface, "Started sniffing");

        let mut read_errors = 0u32;
        while !self.shutdown.is_cancelled() {
            match source.next_frame() {
                Ok(next) => {
                    read_errors = 0;
                    match next {
                        NextFrame::Frame(raw) => self.handle_frame(&raw),
                        NextFrame::Idle => continue,
                        NextFrame::Closed => {
                            tracing::info!(interface = %interface, "Capture session closed");
                            break;
                        }
                    }
                }
                Err(e) => {
                    read_errors += 1;
                    if read_errors >= MAX_READ_ERRORS {
                        tracing::error!(
                            interface = %interface,
                            "Giving up after {} consecutive read errors: {}",
                            read_errors,
                            e
                        );
                        let state =
                            WorkerState::Failed(format!("{} consecutive read errors: {}", read_errors, e));
                        self.board.set_state(interface, state.clone());
                        return state;
                    }
                    if read_errors == 1 {
                        tracing::warn!(interface = %interface, "Recv error: {}", e);
                    } else {
                        tracing::debug!(interface = %interface, "Recv error #{}: {}", read_errors, e);
                    }
                    std::thread::sleep(READ_ERROR_BACKOFF);
                }
            }
        }

        self.board.set_state(interface, WorkerState::Stopped);
        tracing::info!(interface = %interface, "Packet sniffer stopped");
        WorkerState::Stopped
    }

    fn handle_frame(&self, raw: &RawFrame) {
        match decode::extract(&self.interface, raw) {
            Ok(record) => {
                self.registry.append(&self.interface, record);
                self.board.record_captured(&self.interface);
            }
            Err(e) => {
                tracing::debug!(interface = %self.interface, "Skipped packet: {}", e);
                self.board.record_dropped(&self.interface);
            }
        }
    }
}
