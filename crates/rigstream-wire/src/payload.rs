//! Serde mirror of the JSON payload
//!
//! Numbers are read as `f64` and narrowed by the frame decoder, so values
//! that overflow `f32` are caught instead of silently becoming infinite.

use serde::{Deserialize, Serialize};

/// Wire triple: `[x, y, z]`
pub type WireTriple = [f64; 3];

/// Top-level payload object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WirePayload {
    #[serde(default)]
    pub pose: Option<Vec<WireTriple>>,
    #[serde(default)]
    pub left_hand: Option<Vec<WireTriple>>,
    #[serde(default)]
    pub right_hand: Option<Vec<WireTriple>>,
    #[serde(default)]
    pub metrics: Option<WireMetrics>,
}

/// `metrics` object; the producer may send `{}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
}
