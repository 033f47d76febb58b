//! Rigstream Transport Layer - UDP ingestion
//!
//! This crate provides:
//! - Background stream receiver publishing into the latest-frame store
//! - Pose transmitter (producer side)

pub mod receiver;
pub mod transmitter;

pub use receiver::*;
pub use transmitter::*;
