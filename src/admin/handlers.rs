use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::http::AppState;
use crate::routing::RoutingRequest;
use crate::status::{BackendStatus, BenchmarkResult, StatusReport, DEFAULT_PROBE};

#[derive(Debug, Deserialize)]
pub struct BenchmarkRequest {
    #[serde(default = "default_probe")]
    pub prompt: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_probe() -> String {
    DEFAULT_PROBE.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    Weighted,
    Capability,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub mode: SelectMode,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub backend: Option<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.router.status())
}

pub async fn get_backend(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BackendStatus>, StatusCode> {
    state
        .router
        .status()
        .backends
        .into_iter()
        .find(|b| b.name == name)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn run_benchmark(
    State(state): State<AppState>,
    Json(body): Json<BenchmarkRequest>,
) -> Json<BTreeMap<String, BenchmarkResult>> {
    let mut probe = RoutingRequest::new(body.prompt);
    probe.max_tokens = body.max_tokens;
    tracing::info!(request_id = %probe.id, "Benchmark requested");
    Json(state.router.benchmark(&probe).await)
}

pub async fn select_backend(
    State(state): State<AppState>,
    Json(body): Json<SelectRequest>,
) -> Json<SelectResponse> {
    let router = &state.router;
    let id = match body.mode {
        SelectMode::Weighted => router.select_weighted(),
        SelectMode::Capability => router.select_by_capability(&body.capabilities),
    };
    Json(SelectResponse {
        backend: id
            .and_then(|id| router.registry().get(id))
            .map(|b| b.name().to_string()),
    })
}
