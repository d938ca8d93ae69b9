//! Saved simulation runs
//!
//! Runs are scoped to an owner id and listed newest first. A store is either
//! purely in memory or backed by a JSON file that is rewritten on every save.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::core::{SavedRun, SimulationParams, SimulationResult};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User not authenticated")]
    Unauthenticated,

    #[error("No simulation results to save")]
    IncompleteResult,

    #[error("Run {id} not found")]
    NotFound { id: String },

    #[error("Run store I/O error at '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Run store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default)]
pub struct RunStore {
    runs: Vec<SavedRun>,
    file_path: Option<PathBuf>,
}

impl RunStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading existing runs if the file exists
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let runs = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| StoreError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };

        Ok(Self {
            runs,
            file_path: Some(path),
        })
    }

    /// Snapshot a completed result for `owner`, returning the new run id
    pub fn save(
        &mut self,
        owner: Option<&str>,
        params: &SimulationParams,
        result: &SimulationResult,
    ) -> StoreResult<String> {
        let owner = owner.filter(|o| !o.is_empty()).ok_or(StoreError::Unauthenticated)?;

        let (target_true_pos, target_predicted_pos, error) = match (
            result.target_true_pos,
            result.target_predicted_pos,
            result.error,
        ) {
            (Some(t), Some(p), Some(e)) => (t, p, e),
            _ => return Err(StoreError::IncompleteResult),
        };

        let run = SavedRun {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user_id: owner.to_string(),
            params: *params,
            target_true_pos,
            target_predicted_pos,
            error,
            run_data: result.run_data.clone(),
        };
        let id = run.id.clone();

        self.runs.push(run);
        if let Err(e) = self.persist() {
            self.runs.pop();
            return Err(e);
        }

        info!(run_id = %id, owner, "saved simulation run");
        Ok(id)
    }

    /// Runs belonging to `owner`, newest first; anonymous callers see nothing
    pub fn list(&self, owner: Option<&str>) -> Vec<SavedRun> {
        let Some(owner) = owner else {
            return Vec::new();
        };

        let mut runs: Vec<SavedRun> = self
            .runs
            .iter()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        runs
    }

    pub fn get(&self, owner: Option<&str>, id: &str) -> StoreResult<SavedRun> {
        let owner = owner.ok_or(StoreError::Unauthenticated)?;
        self.runs
            .iter()
            .find(|r| r.id == id && r.user_id == owner)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn persist(&self) -> StoreResult<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&self.runs)?;
        fs::write(path, content).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, RssiReading};

    fn completed_result() -> SimulationResult {
        SimulationResult {
            target_true_pos: Some(Position::new(20.0, 30.0)),
            target_predicted_pos: Some(Position::new(21.0, 29.5)),
            error: Some(1.118),
            run_data: vec![RssiReading {
                anchor_id: "A1".to_string(),
                true_dist: 22.36,
                rssi: -73.7,
                est_dist: 22.2,
            }],
        }
    }

    #[test]
    fn test_save_requires_owner() {
        let mut store = RunStore::in_memory();
        let err = store
            .save(None, &SimulationParams::default(), &completed_result())
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthenticated));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_requires_complete_result() {
        let mut store = RunStore::in_memory();
        let partial = SimulationResult::with_target(Position::new(1.0, 2.0));
        let err = store
            .save(Some("user-1"), &SimulationParams::default(), &partial)
            .unwrap_err();
        assert!(matches!(err, StoreError::IncompleteResult));
        assert_eq!(err.to_string(), "No simulation results to save");
    }

    #[test]
    fn test_runs_are_owner_scoped_and_newest_first() {
        let mut store = RunStore::in_memory();
        let params = SimulationParams::default();
        let first = store.save(Some("alice"), &params, &completed_result()).unwrap();
        let second = store.save(Some("alice"), &params, &completed_result()).unwrap();
        store.save(Some("bob"), &params, &completed_result()).unwrap();

        let runs = store.list(Some("alice"));
        assert_eq!(runs.len(), 2);
        assert!(runs[0].timestamp >= runs[1].timestamp);
        assert!(runs.iter().any(|r| r.id == first));
        assert!(runs.iter().any(|r| r.id == second));

        assert_eq!(store.list(Some("bob")).len(), 1);
        assert!(store.list(None).is_empty());

        assert!(store.get(Some("alice"), &first).is_ok());
        assert!(matches!(
            store.get(Some("bob"), &first),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_loaded_run_restores_result() {
        let mut store = RunStore::in_memory();
        let id = store
            .save(Some("alice"), &SimulationParams::default(), &completed_result())
            .unwrap();

        let run = store.get(Some("alice"), &id).unwrap();
        assert_eq!(SimulationResult::from_saved(&run), completed_result());
        assert_eq!(run.params, SimulationParams::default());
    }

    #[test]
    fn test_file_backed_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.json");

        let id = {
            let mut store = RunStore::open(&path).unwrap();
            assert!(store.is_empty());
            store
                .save(Some("alice"), &SimulationParams::default(), &completed_result())
                .unwrap()
        };

        let reopened = RunStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        let run = reopened.get(Some("alice"), &id).unwrap();
        assert_eq!(run.run_data.len(), 1);
        assert_eq!(run.target_true_pos, Position::new(20.0, 30.0));
    }
}
