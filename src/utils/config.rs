use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::algorithms::multilateration::MultilaterationSolver;
use crate::algorithms::signal_model::distance;
use crate::core::{
    AnchorNode, SimulationParams, DEFAULT_FIELD_SIZE_M, DEFAULT_PORT, MIN_ANCHORS,
    SINGULAR_DETERMINANT_THRESHOLD,
};

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP service settings
    pub server: ServerConfig,
    /// Static anchor layout
    pub anchors: Vec<AnchorNode>,
    /// Signal parameters used when a request does not supply its own
    pub default_params: SimulationParams,
    /// Side length of the square simulation field (meters)
    pub field_size_m: f64,
    /// JSON file for saved runs; runs are kept in memory when unset
    pub runs_file: Option<PathBuf>,
    /// Monte Carlo evaluation settings
    pub evaluation: EvaluationConfig,
    /// Enable debug logging
    pub debug_logging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of simulation trials per evaluation
    pub trials: usize,
    /// RNG seed; evaluations are non-deterministic when unset
    pub seed: Option<u64>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Invalid parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            trials: 500,
            seed: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            anchors: default_anchor_layout(),
            default_params: SimulationParams::default(),
            field_size_m: DEFAULT_FIELD_SIZE_M,
            runs_file: None,
            evaluation: EvaluationConfig::default(),
            debug_logging: false,
        }
    }
}

/// Four anchors inset 10 m from the corners of the 100 m field
pub fn default_anchor_layout() -> Vec<AnchorNode> {
    vec![
        AnchorNode::new("A1", 10.0, 10.0),
        AnchorNode::new("A2", 90.0, 10.0),
        AnchorNode::new("A3", 90.0, 90.0),
        AnchorNode::new("A4", 10.0, 90.0),
    ]
}

impl AppConfig {
    /// Load configuration from a JSON file; omitted fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().display().to_string();

        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::Io {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Apply `PORT` from the environment, as hosting platforms expect
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        match std::env::var("PORT") {
            Ok(value) => self.with_port_override(&value),
            Err(_) => Ok(self),
        }
    }

    fn with_port_override(mut self, value: &str) -> Result<Self, ConfigError> {
        self.server.port = value.trim().parse().map_err(|_| ConfigError::InvalidParameter {
            parameter: "PORT".to_string(),
            value: value.to_string(),
            reason: "must be a port number".to_string(),
        })?;
        Ok(self)
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.server.port == 0 {
            report.errors.push(invalid("server.port", "0", "port must be non-zero"));
        }

        if !self.field_size_m.is_finite() || self.field_size_m <= 0.0 {
            report.errors.push(invalid(
                "field_size_m",
                self.field_size_m,
                "field size must be positive",
            ));
        }

        if let Err(e) = self.default_params.validate() {
            report.errors.push(invalid(
                "default_params",
                format!("{:?}", self.default_params),
                e.to_string(),
            ));
        }

        if self.evaluation.trials == 0 {
            report.errors.push(invalid("evaluation.trials", 0, "at least one trial is required"));
        }

        self.validate_anchors(&mut report);
        report
    }

    fn validate_anchors(&self, report: &mut ValidationReport) {
        if self.anchors.len() < MIN_ANCHORS {
            report.errors.push(invalid(
                "anchors",
                self.anchors.len(),
                format!("at least {} anchors are required", MIN_ANCHORS),
            ));
        }

        let mut ids = HashSet::new();
        for anchor in &self.anchors {
            if !ids.insert(anchor.id.as_str()) {
                report.errors.push(invalid("anchors.id", &anchor.id, "anchor ids must be unique"));
            }

            let p = anchor.position;
            if !p.x.is_finite() || !p.y.is_finite() {
                report.errors.push(invalid(
                    "anchors.position",
                    &anchor.id,
                    "coordinates must be finite",
                ));
            } else if p.x < 0.0 || p.y < 0.0 || p.x > self.field_size_m || p.y > self.field_size_m {
                report
                    .warnings
                    .push(format!("Anchor {} lies outside the simulation field", anchor.id));
            }
        }

        for (i, a) in self.anchors.iter().enumerate() {
            for b in &self.anchors[i + 1..] {
                if distance(&a.position, &b.position) < 1.0 {
                    report.warnings.push(format!(
                        "Anchors {} and {} are less than 1 m apart",
                        a.id, b.id
                    ));
                }
            }
        }

        if self.anchors.len() >= MIN_ANCHORS {
            let positions: Vec<_> = self.anchors.iter().map(|a| a.position).collect();
            let det = MultilaterationSolver::normal_matrix_determinant(&positions);
            if det.abs() < SINGULAR_DETERMINANT_THRESHOLD {
                report.warnings.push(
                    "Anchors are collinear; every run will fail with degenerate geometry"
                        .to_string(),
                );
            }
        }
    }
}

fn invalid(
    parameter: &str,
    value: impl ToString,
    reason: impl Into<String>,
) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.anchors.len(), 4);
        assert_eq!(config.default_params.p_tx, -40.0);
        assert_eq!(config.default_params.path_loss_n, 2.5);
        assert_eq!(config.default_params.noise_std_dev, 4.0);

        let report = config.validate();
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "server": { "port": 8080 },
                "default_params": { "pTx": -50, "pathLossN": 3.0, "noiseStdDev": 1.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.default_params.p_tx, -50.0);
        assert_eq!(config.anchors, default_anchor_layout());
    }

    #[test]
    fn test_invalid_config() {
        let config = AppConfig {
            anchors: vec![AnchorNode::new("A1", 0.0, 0.0), AnchorNode::new("A1", 5.0, 5.0)],
            default_params: SimulationParams::new(-40.0, 0.0, -1.0),
            field_size_m: -10.0,
            ..AppConfig::default()
        };

        let report = config.validate();
        assert!(!report.is_valid());
        assert!(report.errors.len() >= 4);
    }

    #[test]
    fn test_collinear_layout_warns() {
        let config = AppConfig {
            anchors: vec![
                AnchorNode::new("A1", 0.0, 50.0),
                AnchorNode::new("A2", 50.0, 50.0),
                AnchorNode::new("A3", 100.0, 50.0),
            ],
            ..AppConfig::default()
        };

        let report = config.validate();
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("collinear")));
    }

    #[test]
    fn test_port_override() {
        let config = AppConfig::default().with_port_override("8081").unwrap();
        assert_eq!(config.server.port, 8081);
        assert!(AppConfig::default().with_port_override("http").is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig {
            runs_file: Some(dir.path().join("runs.json")),
            debug_logging: true,
            ..AppConfig::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
