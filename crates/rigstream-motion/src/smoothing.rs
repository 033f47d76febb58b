//! Per-joint exponential smoothing
//!
//! Each tick moves a joint a fraction of the way toward its mapped target:
//!
//! `new = lerp(current, target, clamp(dt * smoothing_factor, 0, 1))`
//!
//! The clamp bounds the step to the segment between current and target, so
//! a long stall snaps to the target instead of overshooting.

use rigstream_core::{
    GroupKind, LandmarkGroup, PoseFrame, RigConfig, RigError, RigResult, WorldPosition,
};

use crate::{CoordinateMapper, JointHost};

/// Joints written during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Interpolation factor used this tick
    pub blend: f32,
    pub pose: usize,
    pub left_hand: usize,
    pub right_hand: usize,
}

impl TickReport {
    pub fn updated(&self, group: GroupKind) -> usize {
        match group {
            GroupKind::Pose => self.pose,
            GroupKind::LeftHand => self.left_hand,
            GroupKind::RightHand => self.right_hand,
        }
    }

    pub fn total(&self) -> usize {
        self.pose + self.left_hand + self.right_hand
    }

    fn record(&mut self, group: GroupKind, count: usize) {
        match group {
            GroupKind::Pose => self.pose = count,
            GroupKind::LeftHand => self.left_hand = count,
            GroupKind::RightHand => self.right_hand = count,
        }
    }
}

/// Framerate-independent approach toward the latest targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingEngine {
    factor: f32,
}

impl Default for SmoothingEngine {
    fn default() -> Self {
        SmoothingEngine { factor: 15.0 }
    }
}

impl SmoothingEngine {
    /// `factor` is a convergence rate per second, not a time constant
    pub fn new(factor: f32) -> RigResult<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(RigError::ConfigurationError(format!(
                "smoothing factor must be finite and positive, got {}",
                factor
            )));
        }
        Ok(SmoothingEngine { factor })
    }

    pub fn from_config(config: &RigConfig) -> RigResult<Self> {
        Self::new(config.smoothing_factor)
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Interpolation factor for an elapsed `dt` in seconds, always in [0, 1]
    #[inline]
    pub fn blend_factor(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        (dt * self.factor).clamp(0.0, 1.0)
    }

    /// Advance one joint toward `target`
    pub fn step(&self, current: WorldPosition, target: WorldPosition, dt: f32) -> WorldPosition {
        blend(current, target, self.blend_factor(dt))
    }

    /// Apply every group present in `frame` to the host.
    ///
    /// Absent groups are not touched. Landmarks beyond the host's slot count
    /// are ignored.
    pub fn apply_frame<H: JointHost + ?Sized>(
        &self,
        frame: &PoseFrame,
        dt: f32,
        mapper: &CoordinateMapper,
        host: &mut H,
    ) -> TickReport {
        let t = self.blend_factor(dt);
        let mut report = TickReport {
            blend: t,
            ..Default::default()
        };

        for (kind, group) in frame.present_groups() {
            report.record(kind, apply_group(kind, group, t, mapper, host));
        }

        report
    }
}

fn apply_group<H: JointHost + ?Sized>(
    kind: GroupKind,
    group: &LandmarkGroup,
    t: f32,
    mapper: &CoordinateMapper,
    host: &mut H,
) -> usize {
    let mut applied = 0;

    for (index, landmark) in group.iter().enumerate() {
        // Re-read every slot: the host may resize between writes
        let Some(&current) = host.current_targets(kind).get(index) else {
            break;
        };
        let target = mapper.map(landmark);
        host.apply(kind, index, blend(current, target, t));
        applied += 1;
    }

    applied
}

#[inline]
fn blend(current: WorldPosition, target: WorldPosition, t: f32) -> WorldPosition {
    if t >= 1.0 {
        target
    } else {
        current.lerp(&target, t)
    }
}
