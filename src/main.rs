use std::sync::Arc;

use netpulse::api::{self, AppState};
use netpulse::services::metrics::{CpuHistory, MetricsSampler, SysinfoCpu};
use netpulse::services::supervisor::{select_interfaces, Supervisor};
use netpulse::traffic::{CaptureRegistry, InterfaceEnumerator, PcapBackend, WorkerBoard};
use netpulse::{Config, PortScanner};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load env vars
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let backend = Arc::new(PcapBackend);
    let registry = Arc::new(CaptureRegistry::new(config.packet_history));
    let workers = Arc::new(WorkerBoard::new());
    let cpu = Arc::new(CpuHistory::new(config.cpu_history));
    let mut supervisor = Supervisor::new();

    // A failed enumeration leaves capture off but keeps the API and sampler up.
    match backend.list() {
        Ok(found) => {
            tracing::info!("Available interfaces: {:?}", found);
            let selected = select_interfaces(found, config.interfaces.as_deref());
            supervisor.start_capture(&selected, backend.clone(), registry.clone(), workers.clone());
        }
        Err(e) => tracing::error!("Error listing interfaces: {}", e),
    }

    supervisor.start_metrics(MetricsSampler::new(
        SysinfoCpu::new(),
        cpu.clone(),
        config.cpu_interval,
    ));

    let state = AppState {
        registry,
        workers,
        cpu,
        scanner: PortScanner::new(config.scan_timeout, config.scan_workers),
        interfaces: backend,
        shutdown: supervisor.token(),
    };
    let app = api::router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind, e);
            supervisor.shutdown().await;
            std::process::exit(1);
        }
    };
    tracing::info!("listening on {}", config.bind);

    let token = supervisor.token();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown requested");
        token.cancel();
    });
    if let Err(e) = server.await {
        tracing::error!("Server error: {}", e);
    }

    supervisor.shutdown().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
