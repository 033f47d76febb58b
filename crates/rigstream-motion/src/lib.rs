//! Rigstream Motion
//!
//! Turns discrete, noisy landmark frames into continuous joint motion.
//!
//! # Pipeline
//!
//! Landmark (sensor space) → optional [`LandmarkSmoother`] → [`CoordinateMapper`]
//! → target (world space) → [`SmoothingEngine`] → position handed to the [`JointHost`]
//!
//! The engine never owns joint state. It reads the host's current positions
//! and proposes new ones once per tick.

pub mod filter;
pub mod host;
pub mod mapper;
pub mod smoothing;

pub use filter::*;
pub use host::*;
pub use mapper::*;
pub use smoothing::*;
