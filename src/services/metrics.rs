use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use sysinfo::System;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::MetricsError;
use crate::history::BoundedHistory;

pub const DEFAULT_CPU_HISTORY: usize = 60;

pub trait CpuSource: Send {
    /// Utilization in percent since the previous call.
    fn sample(&mut self) -> Result<f32, MetricsError>;
}

/// Global CPU usage as reported by `sysinfo`.
pub struct SysinfoCpu {
    sys: System,
}

impl SysinfoCpu {
    pub fn new() -> Self {
        let mut sys = System::new();
        // usage is a delta, so prime the counters before the first real sample
        sys.refresh_cpu();
        Self { sys }
    }
}

impl Default for SysinfoCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSource for SysinfoCpu {
    fn sample(&mut self) -> Result<f32, MetricsError> {
        self.sys.refresh_cpu();
        if self.sys.cpus().is_empty() {
            return Err(MetricsError::Unavailable);
        }
        Ok(self.sys.global_cpu_info().cpu_usage())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuSnapshot {
    pub cpu_usage: f32,
    pub cpu_history: Vec<f32>,
}

/// Shared CPU history, written by the sampler and read by the API.
pub struct CpuHistory {
    samples: Mutex<BoundedHistory<f32>>,
}

impl CpuHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(BoundedHistory::new(capacity)),
        }
    }

    pub fn record(&self, value: f32) {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        let samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        CpuSnapshot {
            cpu_usage: samples.latest().copied().unwrap_or(0.0),
            cpu_history: samples.to_vec(),
        }
    }
}

impl Default for CpuHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_HISTORY)
    }
}

pub struct MetricsSampler<S> {
    source: S,
    history: Arc<CpuHistory>,
    period: Duration,
}

impl<S: CpuSource> MetricsSampler<S> {
    pub fn new(source: S, history: Arc<CpuHistory>, period: Duration) -> Self {
        Self {
            source,
            history,
            period,
        }
    }

    /// Samples once per period until `shutdown` fires. The first sample is
    /// taken one period after start.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("CPU sampler started (every {:?})", self.period);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick(),
            }
        }
        tracing::info!("CPU sampler stopped");
    }

    /// Takes one sample. Failures are logged and skipped.
    pub fn tick(&mut self) {
        match self.source.sample().and_then(validate) {
            Ok(value) => self.history.record(value),
            Err(e) => tracing::warn!("CPU sample failed, retrying next tick: {}", e),
        }
    }
}

fn validate(value: f32) -> Result<f32, MetricsError> {
    if !value.is_finite() {
        return Err(MetricsError::InvalidSample(value));
    }
    Ok(value.clamp(0.0, 100.0))
}
