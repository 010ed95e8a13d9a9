use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::services::metrics::{CpuSource, MetricsSampler};
use crate::traffic::{CaptureFacility, CaptureRegistry, CaptureWorker, WorkerBoard};

/// Owns every long-lived worker and the token that stops them.
pub struct Supervisor {
    shutdown: CancellationToken,
    workers: JoinSet<()>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            workers: JoinSet::new(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Starts one capture worker per interface on the blocking pool.
    pub fn start_capture(
        &mut self,
        interfaces: &[String],
        facility: Arc<dyn CaptureFacility>,
        registry: Arc<CaptureRegistry>,
        board: Arc<WorkerBoard>,
    ) {
        for interface in interfaces {
            let worker = CaptureWorker::new(
                interface.clone(),
                facility.clone(),
                registry.clone(),
                board.clone(),
                self.shutdown.clone(),
            );
            self.workers.spawn_blocking(move || {
                worker.run();
            });
        }
        tracing::info!("Started {} capture workers", interfaces.len());
    }

    pub fn start_metrics<S>(&mut self, sampler: MetricsSampler<S>)
    where
        S: CpuSource + 'static,
    {
        self.workers.spawn(sampler.run(self.shutdown.clone()));
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Cancels every worker and waits for all of them to exit.
    pub async fn shutdown(mut self) {
        tracing::info!("Stopping {} workers", self.worker_count());
        self.shutdown.cancel();
        while let Some(res) = self.workers.join_next().await {
            if let Err(e) = res {
                tracing::error!("Worker task failed: {}", e);
            }
        }
        tracing::info!("All workers stopped");
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the enumerated interfaces that pass the optional allow-list, in enumeration order.
pub fn select_interfaces(enumerated: Vec<String>, allow: Option<&[String]>) -> Vec<String> {
    match allow {
        Some(allow) => enumerated
            .into_iter()
            .filter(|name| allow.iter().any(|a| a == name))
            .collect(),
        None => enumerated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_filters_and_keeps_order() {
        let all = vec!["eth0".to_string(), "lo".to_string(), "wlan0".to_string()];
        let allow = vec!["wlan0".to_string(), "eth0".to_string(), "missing".to_string()];
        assert_eq!(select_interfaces(all.clone(), Some(&allow)), vec!["eth0", "wlan0"]);
        assert_eq!(select_interfaces(all.clone(), None), all);
    }
}
