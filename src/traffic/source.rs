use pcap::{Active, Capture, Device, Linktype};

use crate::error::CaptureError;
use crate::traffic::model::RawFrame;

const SNAPLEN: i32 = 65535;
// Upper bound on how long a worker can go without checking for shutdown.
const READ_TIMEOUT_MS: i32 = 250;

pub enum NextFrame {
    Frame(RawFrame),
    /// The read timed out without traffic.
    Idle,
    /// The session will not produce any more frames.
    Closed,
}

pub trait InterfaceEnumerator: Send + Sync {
    fn list(&self) -> Result<Vec<String>, CaptureError>;
}

pub trait CaptureFacility: Send + Sync {
    fn open(&self, interface: &str) -> Result<Box<dyn FrameSource>, CaptureError>;
}

pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<NextFrame, CaptureError>;
}

/// libpcap-backed enumeration and live capture.
#[derive(Debug, Default, Clone, Copy)]
pub struct PcapBackend;

impl InterfaceEnumerator for PcapBackend {
    fn list(&self) -> Result<Vec<String>, CaptureError> {
        let devices = Device::list().map_err(|e| CaptureError::Enumerate(e.to_string()))?;
        Ok(devices.into_iter().map(|d| d.name).collect())
    }
}

impl CaptureFacility for PcapBackend {
    fn open(&self, interface: &str) -> Result<Box<dyn FrameSource>, CaptureError> {
        let open_err = |e: pcap::Error| CaptureError::Open {
            interface: interface.to_string(),
            reason: e.to_string(),
        };

        let cap = Capture::from_device(interface)
            .map_err(open_err)?
            .promisc(true)
            .snaplen(SNAPLEN)
            .timeout(READ_TIMEOUT_MS)
            .open()
            .map_err(open_err)?;

        let link = cap.get_datalink();
        if link != Linktype::ETHERNET {
            return Err(CaptureError::Open {
                interface: interface.to_string(),
                reason: format!("unsupported link type {}", link.0),
            });
        }

        Ok(Box::new(PcapSource { cap }))
    }
}

struct PcapSource {
    cap: Capture<Active>,
}

impl FrameSource for PcapSource {
    fn next_frame(&mut self) -> Result<NextFrame, CaptureError> {
        match self.cap.next_packet() {
            Ok(packet) => Ok(NextFrame::Frame(RawFrame {
                data: packet.data.to_vec(),
                wire_len: packet.header.len,
            })),
            Err(pcap::Error::TimeoutExpired) => Ok(NextFrame::Idle),
            Err(pcap::Error::NoMorePackets) => Ok(NextFrame::Closed),
            Err(e) => Err(CaptureError::Read(e.to_string())),
        }
    }
}
