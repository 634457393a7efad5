//! Wire protocol between the client and the worker.
//!
//! Frames are JSON text with camelCase keys. Worker-to-client frames are
//! tagged by `type`.

use plotpass_core::model::PathRecord;
use plotpass_core::{Layer, Pass};
use plotpass_engine::Stage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

fn default_optimize() -> bool {
    true
}

/// Unvalidated layer as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub base_order: usize,
    pub base_label: String,
    pub stroke: String,
    #[serde(default)]
    pub paths: Vec<PathRecord>,
}

impl From<&Layer> for LayerRecord {
    fn from(layer: &Layer) -> Self {
        Self {
            base_order: layer.base_order,
            base_label: layer.base_label.clone(),
            stroke: layer.stroke.clone(),
            paths: layer.paths.iter().cloned().map(PathRecord::from).collect(),
        }
    }
}

/// Render request sent to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub id: Uuid,
    #[serde(default)]
    pub max_travel_per_layer_meters: Option<f64>,
    pub layers: Vec<LayerRecord>,
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

impl RenderRequest {
    /// Builds a request with a fresh correlation id.
    pub fn new(layers: &[Layer], budget_meters: Option<f64>, optimize: bool) -> Self {
        Self::from_records(
            layers.iter().map(LayerRecord::from).collect(),
            budget_meters,
            optimize,
        )
    }

    /// Builds a request from unvalidated records with a fresh correlation id.
    pub fn from_records(layers: Vec<LayerRecord>, budget_meters: Option<f64>, optimize: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            max_travel_per_layer_meters: budget_meters,
            layers,
            optimize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    pub limit_meters: Option<f64>,
    pub split_layers: usize,
    pub total_layers: usize,
    /// Non-fatal resource cap breaches
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Passes and summary of a finished render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    pub passes: Vec<Pass>,
    pub summary: RenderSummary,
}

/// Progress notification republished by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub id: Uuid,
    pub stage: Stage,
    pub completed: usize,
    pub total: usize,
}

/// Frames emitted by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    /// Bootstrapping finished, requests may be sent
    Ready,
    Ack {
        id: Uuid,
    },
    Progress {
        id: Uuid,
        stage: Stage,
        completed: usize,
        total: usize,
    },
    Result {
        id: Uuid,
        passes: Vec<Pass>,
        summary: RenderSummary,
    },
    Error {
        #[serde(default)]
        id: Option<Uuid>,
        error: String,
    },
}

impl WorkerMessage {
    pub fn result(id: Uuid, response: RenderResponse) -> Self {
        WorkerMessage::Result {
            id,
            passes: response.passes,
            summary: response.summary,
        }
    }
}

pub fn encode<T: Serialize>(frame: &T) -> Result<String> {
    Ok(serde_json::to_string(frame)?)
}

pub fn decode_request(frame: &str) -> Result<RenderRequest> {
    Ok(serde_json::from_str(frame)?)
}

pub fn decode_message(frame: &str) -> Result<WorkerMessage> {
    Ok(serde_json::from_str(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;

    #[test]
    fn test_request_defaults() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","layers":[]}"#;
        let request = decode_request(json).unwrap();
        assert!(request.optimize);
        assert_eq!(request.max_travel_per_layer_meters, None);
    }

    #[test]
    fn test_message_tags() {
        assert_eq!(encode(&WorkerMessage::Ready).unwrap(), r#"{"type":"ready"}"#);

        let err = WorkerMessage::Error {
            id: None,
            error: "bad".into(),
        };
        assert_eq!(
            encode(&err).unwrap(),
            r#"{"type":"error","id":null,"error":"bad"}"#
        );
    }

    #[test]
    fn test_progress_frame() {
        let json = r#"{"type":"progress","id":"67e55044-10b1-426f-9247-bb680e5fe0c8","stage":"split","completed":1,"total":1}"#;
        match decode_message(json).unwrap() {
            WorkerMessage::Progress { stage, completed, .. } => {
                assert_eq!(stage, Stage::Split);
                assert_eq!(completed, 1);
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_transport_error() {
        assert!(matches!(
            decode_message("{not json"),
            Err(WorkerError::Transport { .. })
        ));
    }
}
