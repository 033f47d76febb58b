//! World-space positions - what the rig host consumes

/// 3D position in the host's world space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPosition {
    pub const ORIGIN: WorldPosition = WorldPosition {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation.
    ///
    /// Finite endpoints give a finite result, even when they sit at opposite
    /// ends of the f32 range.
    pub fn lerp(&self, other: &WorldPosition, t: f32) -> WorldPosition {
        WorldPosition {
            x: lerp_axis(self.x, other.x, t),
            y: lerp_axis(self.y, other.y, t),
            z: lerp_axis(self.z, other.z, t),
        }
    }

    /// Distance to another position
    pub fn distance(&self, other: &WorldPosition) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// `other - current` overflows f32 near the range limits, so blend in f64
#[inline]
fn lerp_axis(current: f32, other: f32, t: f32) -> f32 {
    let (a, b) = (current as f64, other as f64);
    let value = a + (b - a) * t as f64;
    value.clamp(f32::MIN as f64, f32::MAX as f64) as f32
}
