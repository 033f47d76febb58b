//! Sensor space to world space

use rigstream_core::{LandmarkGroup, LandmarkPoint, RigConfig, WorldPosition};

/// Maps normalized sensor coordinates into a centered world frame.
///
/// - `x' = (x - 0.5) * lateral_scale`
/// - `y' = (0.5 - y) * lateral_scale` (sensor y points down, world y up)
/// - `z' = -z * depth_scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub lateral_scale: f32,
    pub depth_scale: f32,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        CoordinateMapper {
            lateral_scale: 2.0,
            depth_scale: 1.5,
        }
    }
}

impl CoordinateMapper {
    pub fn new(lateral_scale: f32, depth_scale: f32) -> Self {
        Self {
            lateral_scale,
            depth_scale,
        }
    }

    pub fn from_config(config: &RigConfig) -> Self {
        Self::new(config.lateral_scale, config.depth_scale)
    }

    /// Map one landmark
    pub fn map(&self, landmark: &LandmarkPoint) -> WorldPosition {
        let lateral = self.lateral_scale as f64;
        let depth = self.depth_scale as f64;

        WorldPosition {
            x: saturate((landmark.x as f64 - 0.5) * lateral),
            y: saturate((0.5 - landmark.y as f64) * lateral),
            z: saturate(-(landmark.z as f64) * depth),
        }
    }

    /// Map a whole group, preserving order
    pub fn map_group(&self, group: &LandmarkGroup) -> Vec<WorldPosition> {
        group.iter().map(|p| self.map(p)).collect()
    }
}

/// Narrow to `f32`, clamping instead of overflowing to infinity
#[inline]
fn saturate(value: f64) -> f32 {
    value.clamp(f32::MIN as f64, f32::MAX as f64) as f32
}
