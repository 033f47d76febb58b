//! Rigstream Test Harness - synthetic input and hostile delivery
//!
//! This crate provides:
//! - Seeded synthetic landmark producer
//! - Malformed payload corpus
//! - Chaos sender (loss, garbage, truncation) over a real socket
//! - End-to-end loopback integration tests

pub mod chaos;
pub mod corpus;
pub mod integration;
pub mod producer;

pub use chaos::*;
pub use corpus::*;
pub use producer::*;
