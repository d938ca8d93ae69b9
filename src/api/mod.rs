//! HTTP service for the localization simulator
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /api/predict` - Predict a position from anchors and RSSI readings
//! - `POST /api/simulate` - Run one simulation against the configured anchors
//! - `GET /api/runs` - List the caller's saved runs, newest first
//! - `POST /api/runs` - Save a completed run
//! - `GET /api/runs/:id` - Fetch one saved run
//!
//! Run endpoints identify the caller by the `x-user-id` header.

pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};

pub use error::{ApiError, ApiResult};
pub use handlers::USER_ID_HEADER;
pub use state::AppState;
pub use types::*;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/predict", post(handlers::predict))
        .route("/api/simulate", post(handlers::simulate))
        .route("/api/runs", get(handlers::list_runs).post(handlers::save_run))
        .route("/api/runs/:id", get(handlers::get_run))
        .with_state(state)
}
