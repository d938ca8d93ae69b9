use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::core::{SavedRun, SimulationResult, MIN_ANCHORS};
use crate::validation::error::LocalizationError;

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use super::types::{
    HealthResponse, PredictRequest, PredictResponse, SaveRunRequest, SaveRunResponse,
    SimulateRequest,
};

/// Header carrying the caller's identity for run storage
pub const USER_ID_HEADER: &str = "x-user-id";

fn owner(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Predict a position from caller-supplied anchors and RSSI readings
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let Json(request) = payload?;

    let (Some(anchors), Some(readings), Some(params)) =
        (request.anchors, request.rssi_readings, request.params)
    else {
        return Err(LocalizationError::MissingFields {
            fields: "anchors, rssiReadings, or params".to_string(),
        }
        .into());
    };

    if anchors.len() < MIN_ANCHORS {
        return Err(LocalizationError::InsufficientAnchors {
            available: anchors.len(),
            required: MIN_ANCHORS,
        }
        .into());
    }

    let predicted_pos = state.predictor.predict(&anchors, &readings, &params)?;
    debug!(
        x = predicted_pos.x,
        y = predicted_pos.y,
        anchors = anchors.len(),
        "prediction served"
    );

    Ok(Json(PredictResponse { predicted_pos }))
}

/// Run one simulation against the configured anchor layout
pub async fn simulate(
    State(state): State<AppState>,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> ApiResult<Json<SimulationResult>> {
    let Json(request) = payload?;
    let params = request.params.unwrap_or(state.default_params);

    let mut rng = match request.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let result = state.simulator.run(request.target, &params, &mut rng)?;
    Ok(Json(result))
}

pub async fn list_runs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<SavedRun>>> {
    let runs = state.read_runs()?.list(owner(&headers));
    Ok(Json(runs))
}

pub async fn save_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SaveRunRequest>, JsonRejection>,
) -> ApiResult<Json<SaveRunResponse>> {
    let Json(request) = payload?;
    let owner = owner(&headers).map(str::to_owned);

    // File-backed stores write to disk while holding the lock
    let id = tokio::task::spawn_blocking(move || -> ApiResult<String> {
        let mut runs = state.write_runs()?;
        Ok(runs.save(owner.as_deref(), &request.params, &request.result)?)
    })
    .await
    .map_err(|e| ApiError::internal(format!("run store task failed: {}", e)))??;

    Ok(Json(SaveRunResponse { id }))
}

pub async fn get_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<SavedRun>> {
    let run = state.read_runs()?.get(owner(&headers), &id)?;
    Ok(Json(run))
}
