//! Rigstream Runtime - engine orchestration and the per-tick loop
//!
//! Each host tick runs these stages:
//! 1. Poll the latest-frame store for a frame newer than the last tick
//! 2. Pick the frame to apply (fresh, or last one under `StalePolicy::Converge`)
//! 3. Map landmarks to world space
//! 4. Blend every present joint toward its target
//! 5. Update staleness and tick statistics
//!
//! Ingestion runs independently on the receiver task.

pub mod engine;
pub mod telemetry;

pub use engine::*;
pub use telemetry::*;
