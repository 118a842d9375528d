//! Recording stand-in for the fan device.
#![allow(dead_code)] // Not every test file uses every helper

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use fanpanel::{MemoryView, PanelController};
use fanpanel_client::{ClientConfig, DeviceClient};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: Method,
    /// Path plus query, e.g. `/fan?name=Front`.
    pub uri: String,
    pub body: Option<Value>,
}

pub struct MockSettings {
    pub fans: Value,
    pub fans_status: StatusCode,
    pub power_status: StatusCode,
    pub manager: Value,
    pub manager_status: StatusCode,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            fans: json!([{"speed": 1200, "power": 40}, {"speed": 900, "power": 25}]),
            fans_status: StatusCode::OK,
            power_status: StatusCode::OK,
            manager: json!({"runtimeOfFans": 600, "interval": 300}),
            manager_status: StatusCode::OK,
        }
    }
}

#[derive(Clone, Default)]
pub struct MockDevice {
    pub settings: Arc<Mutex<MockSettings>>,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockDevice {
    pub fn set(&self, f: impl FnOnce(&mut MockSettings)) {
        f(&mut self.settings.lock().unwrap());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.method == Method::POST).collect()
    }

    pub fn count(&self, method: Method, uri: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method && r.uri == uri).count()
    }

    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }
}

async fn handle(State(device): State<MockDevice>, request: Request) -> Response {
    let method = request.method().clone();
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let path = request.uri().path().to_string();
    let bytes: Bytes = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap_or_default();
    let body = serde_json::from_slice(&bytes).ok();
    device.requests.lock().unwrap().push(Recorded { method: method.clone(), uri, body });

    let settings = device.settings.lock().unwrap();
    match (method, path.as_str()) {
        (Method::GET, "/fan") => (settings.fans_status, settings.fans.to_string()).into_response(),
        (Method::POST, "/fan") => settings.power_status.into_response(),
        (Method::GET, "/fanManager") => (settings.manager_status, settings.manager.to_string()).into_response(),
        (Method::POST, "/fanManager") => settings.manager_status.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn spawn_mock() -> (MockDevice, SocketAddr) {
    let device = MockDevice::default();
    let app = Router::new().fallback(handle).with_state(device.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (device, addr)
}

pub fn panel_for(addr: SocketAddr, poll_period: Duration) -> Arc<PanelController<MemoryView>> {
    let client = DeviceClient::new(&ClientConfig::new(format!("http://{addr}"))).unwrap();
    Arc::new(PanelController::new(client, MemoryView::fan_panel(), poll_period))
}
