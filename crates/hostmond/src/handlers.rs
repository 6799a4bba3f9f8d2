//! HTTP request handlers for the metrics endpoint and the status API.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

use hostmon_core::alert::AlertResult;

use crate::state::SharedState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

// ============================================================
// Metrics
// ============================================================

pub(crate) async fn handle_metrics(State(state): State<SharedState>) -> Response {
    let rendered = {
        let inner = state.lock().unwrap();
        inner.metrics.render()
    };

    match rendered {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================
// Health
// ============================================================

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Status
// ============================================================

#[derive(Serialize)]
pub(crate) struct StatusResponse {
    version: &'static str,
    tick_count: u64,
    baseline_primed: bool,
    monitored_entities: usize,
    last_collect_ms: Option<u64>,
    last_alert: Option<AlertResult>,
}

pub(crate) async fn handle_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let inner = state.lock().unwrap();
    Json(StatusResponse {
        version: hostmon_core::VERSION,
        tick_count: inner.tick_count,
        baseline_primed: inner.baseline.is_some(),
        monitored_entities: inner.thresholds.len(),
        last_collect_ms: inner
            .collector
            .last_timing()
            .map(|t| t.total.as_millis() as u64),
        last_alert: inner.last_alert.clone(),
    })
}
