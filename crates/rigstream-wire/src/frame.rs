//! Pose frame decoding and encoding
//!
//! Decoding is all-or-nothing: a payload either yields a complete
//! [`PoseFrame`] or a [`DecodeError`], never a partial frame.

use rigstream_core::{
    DecodeError, GroupKind, LandmarkGroup, LandmarkPoint, Metrics, PoseFrame, RigError, RigResult,
};

use crate::{WireMetrics, WirePayload, WireTriple};

/// Largest payload a single UDP datagram can carry over IPv4
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

const AXES: [&str; 3] = ["x", "y", "z"];

/// Decode one datagram into a pose frame
pub fn decode_frame(buf: &[u8]) -> Result<PoseFrame, DecodeError> {
    if buf.is_empty() {
        return Err(DecodeError::Empty);
    }

    let text = std::str::from_utf8(buf).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;

    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }
    // Serde would otherwise accept a bare array as a struct in sequence form
    if !trimmed.starts_with('{') {
        return Err(DecodeError::Malformed(
            "top-level value must be an object".into(),
        ));
    }

    let payload: WirePayload =
        serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    payload_to_frame(payload)
}

/// Convert a parsed payload, narrowing every number to a finite `f32`
pub fn payload_to_frame(payload: WirePayload) -> Result<PoseFrame, DecodeError> {
    let mut frame = PoseFrame::new();

    let groups = [
        (GroupKind::Pose, payload.pose),
        (GroupKind::LeftHand, payload.left_hand),
        (GroupKind::RightHand, payload.right_hand),
    ];

    for (kind, triples) in groups {
        if let Some(triples) = triples {
            frame.set_group(kind, Some(decode_group(kind, &triples)?));
        }
    }

    if let Some(metrics) = payload.metrics {
        frame.metrics = Some(decode_metrics(&metrics)?);
    }

    Ok(frame)
}

fn decode_group(kind: GroupKind, triples: &[WireTriple]) -> Result<LandmarkGroup, DecodeError> {
    triples
        .iter()
        .enumerate()
        .map(|(index, triple)| -> Result<LandmarkPoint, DecodeError> {
            let mut point = [0.0f32; 3];
            for (axis, value) in triple.iter().enumerate() {
                point[axis] = narrow(*value)
                    .ok_or_else(|| non_finite(format!("{}[{}].{}", kind, index, AXES[axis])))?;
            }
            Ok(LandmarkPoint::from(point))
        })
        .collect()
}

fn decode_metrics(metrics: &WireMetrics) -> Result<Metrics, DecodeError> {
    let field = |value: Option<f64>, name: &str| -> Result<Option<f32>, DecodeError> {
        value
            .map(|v| narrow(v).ok_or_else(|| non_finite(format!("metrics.{}", name))))
            .transpose()
    };

    Ok(Metrics {
        inference_ms: field(metrics.inference_ms, "inference_ms")?,
        fps: field(metrics.fps, "fps")?,
        intensity: field(metrics.intensity, "intensity")?,
    })
}

#[inline]
fn narrow(value: f64) -> Option<f32> {
    let narrowed = value as f32;
    narrowed.is_finite().then_some(narrowed)
}

fn non_finite(field: String) -> DecodeError {
    DecodeError::NonFinite { field }
}

/// Encode a frame into the wire payload
pub fn encode_frame(frame: &PoseFrame) -> RigResult<Vec<u8>> {
    let payload = frame_to_payload(frame)?;
    let bytes = serde_json::to_vec(&payload).map_err(|e| RigError::EncodeError(e.to_string()))?;

    if bytes.len() > MAX_DATAGRAM_SIZE {
        return Err(RigError::PayloadTooLarge {
            size: bytes.len(),
            max: MAX_DATAGRAM_SIZE,
        });
    }

    Ok(bytes)
}

/// Build the serde payload, rejecting values JSON cannot carry
pub fn frame_to_payload(frame: &PoseFrame) -> RigResult<WirePayload> {
    let encode_group = |kind: GroupKind| -> RigResult<Option<Vec<WireTriple>>> {
        let Some(group) = frame.group(kind) else {
            return Ok(None);
        };
        group
            .iter()
            .enumerate()
            .map(|(index, p)| {
                if !p.is_finite() {
                    return Err(RigError::EncodeError(format!(
                        "non-finite landmark {}[{}]",
                        kind, index
                    )));
                }
                Ok([p.x as f64, p.y as f64, p.z as f64])
            })
            .collect::<RigResult<Vec<_>>>()
            .map(Some)
    };

    let metrics = match frame.metrics {
        Some(m) => {
            let values = [m.inference_ms, m.fps, m.intensity];
            if values.iter().flatten().any(|v| !v.is_finite()) {
                return Err(RigError::EncodeError("non-finite metric".into()));
            }
            Some(WireMetrics {
                inference_ms: m.inference_ms.map(f64::from),
                fps: m.fps.map(f64::from),
                intensity: m.intensity.map(f64::from),
            })
        }
        None => None,
    };

    Ok(WirePayload {
        pose: encode_group(GroupKind::Pose)?,
        left_hand: encode_group(GroupKind::LeftHand)?,
        right_hand: encode_group(GroupKind::RightHand)?,
        metrics,
    })
}
