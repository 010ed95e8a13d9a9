use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use netpulse::api::{router, AppState};
use netpulse::services::metrics::CpuHistory;
use netpulse::traffic::{CaptureRegistry, InterfaceEnumerator, PacketRecord, WorkerBoard, WorkerState};
use netpulse::{CaptureError, PortScanner};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct FixedInterfaces(Vec<&'static str>);

impl InterfaceEnumerator for FixedInterfaces {
    fn list(&self) -> Result<Vec<String>, CaptureError> {
        Ok(self.0.iter().map(|s| s.to_string()).collect())
    }
}

struct Harness {
    registry: Arc<CaptureRegistry>,
    workers: Arc<WorkerBoard>,
    cpu: Arc<CpuHistory>,
    app: Router,
}

fn harness() -> Harness {
    let registry = Arc::new(CaptureRegistry::new(100));
    let workers = Arc::new(WorkerBoard::new());
    let cpu = Arc::new(CpuHistory::new(60));
    let app = router(AppState {
        registry: registry.clone(),
        workers: workers.clone(),
        cpu: cpu.clone(),
        scanner: PortScanner::default(),
        interfaces: Arc::new(FixedInterfaces(vec!["eth0", "wlan0"])),
        shutdown: CancellationToken::new(),
    });
    Harness {
        registry,
        workers,
        cpu,
        app,
    }
}

fn record(interface: &str) -> PacketRecord {
    PacketRecord {
        interface: interface.to_string(),
        src_mac: "02:00:00:00:00:01".into(),
        dst_mac: "02:00:00:00:00:02".into(),
        src_ip: Some("10.0.0.1".parse().unwrap()),
        dst_ip: None,
        protocol: "UDP".into(),
        length: 60,
        captured_at: Utc::now(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn packets_empty_registry_is_informational() {
    let h = harness();
    let (status, body) = send(h.app, get("/api/packets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No packets captured yet." }));
}

#[tokio::test]
async fn packets_grouped_by_interface() {
    let h = harness();
    h.registry.append("eth0", record("eth0"));
    h.registry.append("eth0", record("eth0"));
    h.registry.append("wlan0", record("wlan0"));

    let (status, body) = send(h.app.clone(), get("/api/packets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eth0"].as_array().unwrap().len(), 2);
    assert_eq!(body["wlan0"][0]["interface"], "wlan0");
    assert_eq!(body["wlan0"][0]["src_ip"], "10.0.0.1");
    assert_eq!(body["wlan0"][0]["dst_ip"], Value::Null);

    let (_, one) = send(h.app.clone(), get("/api/packets/eth0")).await;
    assert_eq!(one.as_array().unwrap().len(), 2);

    let (status, none) = send(h.app, get("/api/packets/eth9")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn system_reports_latest_and_history() {
    let h = harness();
    let (_, empty) = send(h.app.clone(), get("/api/system")).await;
    assert_eq!(empty, json!({ "cpu_usage": 0.0, "cpu_history": [] }));

    h.cpu.record(10.0);
    h.cpu.record(25.5);
    let (_, body) = send(h.app, get("/api/system")).await;
    assert_eq!(body, json!({ "cpu_usage": 25.5, "cpu_history": [10.0, 25.5] }));
}

#[tokio::test]
async fn scan_without_target_is_bad_request() {
    let h = harness();
    let (status, body) = send(h.app.clone(), post_json("/api/scan", json!({ "ports": [22] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "target is required");

    let (status, _) = send(h.app.clone(), post_json("/api/scan", json!({ "target": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(h.app, get("/api/scan")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_rejects_invalid_ports() {
    let h = harness();
    let (status, body) = send(
        h.app.clone(),
        post_json("/api/scan", json!({ "target": "127.0.0.1", "ports": [80, 70000] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("70000"));

    let (status, _) = send(h.app, get("/api/scan?ip=127.0.0.1&ports=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_malformed_json_is_bad_request() {
    let h = harness();
    let request = Request::post("/api/scan")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn scan_finds_listening_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();

    let h = harness();
    let (status, body) = send(
        h.app,
        post_json("/api/scan", json!({ "target": "127.0.0.1", "ports": [open] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "target": "127.0.0.1", "open_ports": [open] }));
}

#[tokio::test]
async fn scan_with_nothing_open_says_so() {
    let h = harness();
    let (status, body) = send(
        h.app.clone(),
        post_json("/api/scan", json!({ "target": "127.0.0.1", "ports": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["open_ports"], json!([]));
    assert_eq!(body["message"], "No open ports found");
}

#[tokio::test]
async fn scan_of_unresolvable_name_finds_nothing_open() {
    let h = harness();
    for ports in [json!([]), json!([22, 80])] {
        let (status, body) = send(
            h.app.clone(),
            post_json("/api/scan", json!({ "target": "no-such-host.invalid", "ports": ports })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "target": "no-such-host.invalid",
                "open_ports": [],
                "message": "No open ports found"
            })
        );
    }
}

#[tokio::test]
async fn interfaces_include_worker_status() {
    let h = harness();
    h.workers.set_state("eth0", WorkerState::Capturing);
    h.workers.record_captured("eth0");

    let (status, body) = send(h.app, get("/api/interfaces")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "interfaces": [
                { "name": "eth0", "worker": { "state": "capturing", "captured": 1, "dropped": 0 } },
                { "name": "wlan0", "worker": null }
            ]
        })
    );
}

#[tokio::test]
async fn interfaces_keep_workers_of_vanished_devices() {
    let h = harness();
    h.workers.set_state("usb0", WorkerState::Failed("device went away".into()));

    let (status, body) = send(h.app, get("/api/interfaces")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["interfaces"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["eth0", "wlan0", "usb0"]);
    assert_eq!(
        body["interfaces"][2]["worker"]["state"],
        json!({ "failed": "device went away" })
    );
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let h = harness();
    let (status, body) = send(h.app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not found" }));
}
