//! Shared state handed to every handler

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::algorithms::predictor::Predictor;
use crate::core::SimulationParams;
use crate::simulation::Simulator;
use crate::storage::RunStore;

use super::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    /// Estimator behind `/api/predict`
    pub predictor: Arc<dyn Predictor>,
    pub simulator: Simulator,
    /// Used when a simulate request omits its params
    pub default_params: SimulationParams,
    pub runs: Arc<RwLock<RunStore>>,
}

impl AppState {
    pub fn new(simulator: Simulator, default_params: SimulationParams, runs: RunStore) -> Self {
        Self {
            predictor: Arc::clone(simulator.predictor()),
            simulator,
            default_params,
            runs: Arc::new(RwLock::new(runs)),
        }
    }

    pub fn read_runs(&self) -> Result<RwLockReadGuard<'_, RunStore>, ApiError> {
        self.runs.read().map_err(poisoned)
    }

    pub fn write_runs(&self) -> Result<RwLockWriteGuard<'_, RunStore>, ApiError> {
        self.runs.write().map_err(poisoned)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> ApiError {
    ApiError::internal("run store lock poisoned")
}
