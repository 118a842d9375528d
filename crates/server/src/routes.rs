use std::path::Path;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use fanpanel_core::{FAN_ENDPOINT, FAN_MANAGER_ENDPOINT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use crate::DeviceState;

#[derive(Deserialize)]
struct FanQuery {
    name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManagerResponse {
    interval: u16,
    runtime_of_fans: u16,
}

/// Device routes; with `assets_dir` set, everything else is served from
/// there, falling back to its `index.html`.
pub fn router(state: DeviceState, assets_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/version", get(version))
        .route("/metrics", get(metrics_handler))
        .route(FAN_ENDPOINT, get(get_fans).post(set_fan_power).fallback(method_not_allowed))
        .route(
            FAN_MANAGER_ENDPOINT,
            get(get_manager).post(set_manager).fallback(method_not_allowed),
        )
        .with_state(state);

    match assets_dir {
        Some(dir) => {
            let static_service = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            app.fallback_service(static_service)
        }
        None => app,
    }
}

async fn healthz() -> &'static str { "ok" }

async fn version() -> Json<Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics_handler(State(state): State<DeviceState>) -> Response {
    state.metrics.observe(&*state.bank.read().await);
    match state.metrics.encode() {
        Ok((content_type, body)) => ([(CONTENT_TYPE, content_type)], body).into_response(),
        Err(err) => {
            error!(?err, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n")
}

async fn get_fans(State(state): State<DeviceState>) -> impl IntoResponse {
    Json(state.bank.read().await.readings())
}

async fn set_fan_power(State(state): State<DeviceState>, Query(query): Query<FanQuery>, body: Bytes) -> Response {
    let Some(name) = query.name.filter(|n| !n.is_empty()) else {
        return reject(&state, StatusCode::BAD_REQUEST, "Missing 'name' query parameter\n");
    };

    let mut bank = state.bank.write().await;
    if bank.fan(&name).is_none() {
        drop(bank);
        return reject(&state, StatusCode::NOT_FOUND, "Fan not found\n");
    }

    // Fractions are truncated, as the firmware's JSON reader does
    let power = json_number(&body, "power").map(|p| p.trunc());
    match power {
        Some(p) if (0.0..=100.0).contains(&p) => {
            bank.set_power(&name, p as u8);
            state.metrics.observe(&bank);
            state.metrics.power_updates_total.inc();
            info!(fan = %name, power = p as u8, "fan power set");
            (StatusCode::OK, "Power set successfully\n").into_response()
        }
        _ => {
            drop(bank);
            error!(fan = %name, "invalid 'power' parameter");
            reject(&state, StatusCode::BAD_REQUEST, "Invalid 'power' parameter\n")
        }
    }
}

async fn get_manager(State(state): State<DeviceState>) -> impl IntoResponse {
    let bank = state.bank.read().await;
    Json(ManagerResponse { interval: bank.interval_secs(), runtime_of_fans: bank.runtime_secs() })
}

async fn set_manager(State(state): State<DeviceState>, body: Bytes) -> Response {
    let (Some(interval), Some(runtime)) = (json_number(&body, "interval"), json_number(&body, "runtimeOfFans")) else {
        return reject(&state, StatusCode::BAD_REQUEST, "Invalid JSON body\n");
    };

    // `as` saturates, so negative or huge values clamp to the u16 range
    let mut bank = state.bank.write().await;
    bank.set_interval_secs(interval as u16);
    bank.set_runtime_secs(runtime as u16);
    state.metrics.settings_updates_total.inc();
    info!(interval_secs = bank.interval_secs(), runtime_secs = bank.runtime_secs(), "fan manager updated");
    (StatusCode::OK, "Fan manager updated successfully\n").into_response()
}

fn json_number(body: &[u8], key: &str) -> Option<f64> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get(key)?.as_f64()
}

fn reject(state: &DeviceState, status: StatusCode, message: &'static str) -> Response {
    state.metrics.rejected_requests_total.inc();
    (status, message).into_response()
}
