//! Rigstream State - the single shared slot between ingestion and rendering
//!
//! This crate provides:
//! - Latest-frame store (last-write-wins, no queue)
//! - Consumer cursor for "new since last tick" detection

pub mod cursor;
pub mod store;

pub use cursor::*;
pub use store::*;
