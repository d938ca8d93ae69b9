//! Request and response bodies for the HTTP service

use serde::{Deserialize, Serialize};

use crate::core::{
    AnchorNode, PathLossModel, Position, RssiObservation, SimulationParams, SimulationResult,
};

/// Body of `POST /api/predict`.
///
/// Fields are optional so a missing one is reported with the service's own
/// message instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub anchors: Option<Vec<AnchorNode>>,
    pub rssi_readings: Option<Vec<RssiObservation>>,
    pub params: Option<PathLossModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub predicted_pos: Position,
}

/// Body of `POST /api/simulate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub target: Position,
    #[serde(default)]
    pub params: Option<SimulationParams>,
    /// Fixes the noise sequence for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Body of `POST /api/runs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRunRequest {
    pub params: SimulationParams,
    pub result: SimulationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRunResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Server is running".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_request_wire_format() {
        let request: PredictRequest = serde_json::from_str(
            r#"{
                "anchors": [{ "id": "A1", "x": 10, "y": 10 }],
                "rssiReadings": [{ "id": "A1", "rssi": -72.5 }],
                "params": { "pTx": -40, "n": 2.5 }
            }"#,
        )
        .unwrap();

        let anchors = request.anchors.unwrap();
        assert_eq!(anchors[0], AnchorNode::new("A1", 10.0, 10.0));
        assert_eq!(request.rssi_readings.unwrap()[0].rssi, -72.5);
        assert_eq!(request.params.unwrap().path_loss_n, 2.5);
    }

    #[test]
    fn test_partial_predict_request() {
        let request: PredictRequest = serde_json::from_str(r#"{ "anchors": [] }"#).unwrap();
        assert!(request.anchors.is_some());
        assert!(request.rssi_readings.is_none());
        assert!(request.params.is_none());
    }

    #[test]
    fn test_predict_response_wire_format() {
        let response = PredictResponse {
            predicted_pos: Position::new(1.5, 2.0),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["predictedPos"]["x"], 1.5);
    }
}
