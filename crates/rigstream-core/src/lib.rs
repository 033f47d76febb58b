//! Rigstream Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every rigstream crate:
//! - Landmark groups and pose frames (sensor space)
//! - World-space positions (rig space)
//! - Error taxonomy
//! - Engine configuration

pub mod config;
pub mod error;
pub mod landmark;
pub mod position;

pub use config::*;
pub use error::*;
pub use landmark::*;
pub use position::*;
