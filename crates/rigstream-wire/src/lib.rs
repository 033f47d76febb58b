//! Rigstream Wire Format - landmark payloads
//!
//! One datagram carries one UTF-8 JSON object:
//! - `pose`, `left_hand`, `right_hand`: optional arrays of `[x, y, z]`
//! - `metrics`: optional `{inference_ms, fps, intensity}`
//!
//! Unknown fields are ignored. There is no versioning.

pub mod frame;
pub mod payload;

pub use frame::*;
pub use payload::*;
