use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::ScanError;
use crate::scanner::{PortSet, ScanRequest, ScanResult};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_WORKERS: usize = 200;

/// TCP connect scanner. Holds no state between scans.
#[derive(Debug, Clone)]
pub struct PortScanner {
    timeout: Duration,
    max_workers: usize,
}

impl PortScanner {
    pub fn new(timeout: Duration, max_workers: usize) -> Self {
        Self {
            timeout,
            max_workers: max_workers.max(1),
        }
    }

    pub async fn scan(
        &self,
        request: &ScanRequest,
        cancel: CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        if request.ports.is_empty() {
            return Ok(ScanResult::empty(&request.target));
        }

        // a name that does not resolve leaves every port unreachable
        let ip = match resolve(&request.target).await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!("{}, reporting no open ports", e);
                return Ok(ScanResult::empty(&request.target));
            }
        };

        tracing::info!(
            "Starting scan of {} ports on {} ({})",
            request.ports.len(),
            request.target,
            ip
        );
        let open_ports = self.scan_addr(ip, &request.ports, cancel).await?;
        tracing::info!("Scan of {} finished: {} open", request.target, open_ports.len());

        Ok(ScanResult {
            target: request.target.clone(),
            open_ports,
        })
    }

    /// Probes every port with at most `min(ports, max_workers)` connects in
    /// flight. Returns the open ports in ascending order.
    pub async fn scan_addr(
        &self,
        ip: IpAddr,
        ports: &PortSet,
        cancel: CancellationToken,
    ) -> Result<Vec<u16>, ScanError> {
        if ports.is_empty() {
            return Ok(Vec::new());
        }

        let pool = ports.len().min(self.max_workers);
        let permits = Arc::new(Semaphore::new(pool));
        // dropping the set on an early return aborts whatever is still in flight
        let mut probes = JoinSet::new();

        for port in ports.iter() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                permit = permits.clone().acquire_owned() => {
                    permit.map_err(|e| ScanError::Internal(e.to_string()))?
                }
            };
            let timeout = self.timeout;
            probes.spawn(async move {
                let _permit = permit;
                probe(SocketAddr::new(ip, port), timeout).await.then_some(port)
            });
        }

        let mut open = Vec::new();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                next = probes.join_next() => match next {
                    Some(Ok(Some(port))) => open.push(port),
                    Some(Ok(None)) => {}
                    Some(Err(e)) => {
                        tracing::error!("Probe task failed: {}", e);
                        return Err(ScanError::Internal(e.to_string()));
                    }
                    None => break,
                },
            }
        }

        open.sort_unstable();
        Ok(open)
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT, DEFAULT_MAX_WORKERS)
    }
}

/// Any failure to connect in time counts as "not open".
async fn probe(addr: SocketAddr, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// Resolves an IP literal or host name, preferring an IPv4 address.
pub async fn resolve(target: &str) -> Result<IpAddr, ScanError> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }
    let addrs: Vec<IpAddr> = tokio::net::lookup_host((target, 0))
        .await
        .map_err(|_| ScanError::Unresolvable(target.to_string()))?
        .map(|addr| addr.ip())
        .collect();
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| ScanError::Unresolvable(target.to_string()))
}
