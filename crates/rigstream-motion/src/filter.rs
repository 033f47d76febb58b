//! One-Euro landmark filter
//!
//! Adaptive low-pass over raw tracker output. A still landmark gets a low
//! cutoff and loses its jitter; a fast one raises the cutoff with its speed
//! so the filter does not lag behind real motion.
//!
//! State is kept in f64 so hostile but finite coordinates cannot overflow
//! the speed estimate.

use std::time::Instant;

use rigstream_core::{
    GroupKind, LandmarkGroup, LandmarkPoint, OneEuroConfig, PoseFrame, RigResult,
};

/// alpha = 1 / (1 + tau/Te), tau = 1/(2*pi*fc)
fn smoothing_factor(te: f64, cutoff: f64) -> f64 {
    let r = 2.0 * std::f64::consts::PI * cutoff * te;
    r / (r + 1.0)
}

/// Exponential low-pass component
#[derive(Debug, Clone, Copy, Default)]
struct LowPass {
    prev: Option<f64>,
}

impl LowPass {
    fn filter(&mut self, value: f64, alpha: f64) -> f64 {
        let result = match self.prev {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        self.prev = Some(result);
        result
    }
}

/// One-Euro filter for a single scalar
#[derive(Debug, Clone, Copy)]
pub struct OneEuroFilter {
    config: OneEuroConfig,
    x: LowPass,
    dx: LowPass,
    prev_value: Option<f64>,
}

impl OneEuroFilter {
    pub fn new(config: OneEuroConfig) -> Self {
        OneEuroFilter {
            config,
            x: LowPass::default(),
            dx: LowPass::default(),
            prev_value: None,
        }
    }

    /// Filter one sample taken `dt` seconds after the previous one.
    ///
    /// The first sample passes through. A non-positive or NaN `dt` returns
    /// the previous output and leaves the state untouched.
    pub fn filter(&mut self, value: f32, dt: f32) -> f32 {
        let value = value as f64;
        let Some(prev) = self.prev_value else {
            self.prev_value = Some(value);
            return to_f32(self.x.filter(value, 1.0));
        };
        if dt.is_nan() || dt <= 0.0 {
            return to_f32(self.x.prev.unwrap_or(value));
        }

        let te = dt as f64;
        self.prev_value = Some(value);

        let dx = self
            .dx
            .filter((value - prev) / te, smoothing_factor(te, self.config.d_cutoff as f64));
        let cutoff = self.config.min_cutoff as f64 + self.config.beta as f64 * dx.abs();
        to_f32(self.x.filter(value, smoothing_factor(te, cutoff)))
    }

    /// Last filtered value
    pub fn last(&self) -> Option<f32> {
        self.x.prev.map(to_f32)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

#[inline]
fn to_f32(value: f64) -> f32 {
    value.clamp(f32::MIN as f64, f32::MAX as f64) as f32
}

/// One-Euro filter per landmark coordinate, across every group of a frame
#[derive(Debug, Clone)]
pub struct LandmarkSmoother {
    config: OneEuroConfig,
    pose: Vec<[OneEuroFilter; 3]>,
    left_hand: Vec<[OneEuroFilter; 3]>,
    right_hand: Vec<[OneEuroFilter; 3]>,
    last_time: Option<Instant>,
}

impl LandmarkSmoother {
    pub fn new(config: OneEuroConfig) -> RigResult<Self> {
        config.validate()?;
        Ok(LandmarkSmoother {
            config,
            pose: Vec::new(),
            left_hand: Vec::new(),
            right_hand: Vec::new(),
            last_time: None,
        })
    }

    pub fn config(&self) -> &OneEuroConfig {
        &self.config
    }

    /// Filter a frame captured at `at`.
    ///
    /// Metrics pass through unchanged. A group missing from the frame drops
    /// its filter state, so a hand that comes back starts unfiltered instead
    /// of being dragged from where it was lost.
    pub fn apply(&mut self, frame: &PoseFrame, at: Instant) -> PoseFrame {
        // Out-of-order timestamps hold the previous output
        let dt = match self.last_time {
            Some(last) if at > last => at.duration_since(last).as_secs_f32(),
            _ => 0.0,
        };
        if self.last_time.map_or(true, |last| at > last) {
            self.last_time = Some(at);
        }

        let mut out = frame.clone();
        for &kind in GroupKind::all() {
            let config = self.config;
            let filters = self.filters_mut(kind);
            match frame.group(kind) {
                Some(group) => {
                    filters.truncate(group.len());
                    filters.resize_with(group.len(), || [OneEuroFilter::new(config); 3]);
                    out.set_group(kind, Some(filter_group(group, filters, dt)));
                }
                None => filters.clear(),
            }
        }
        out
    }

    /// Forget every landmark; the next frame passes through
    pub fn reset(&mut self) {
        for &kind in GroupKind::all() {
            self.filters_mut(kind).clear();
        }
        self.last_time = None;
    }

    fn filters_mut(&mut self, kind: GroupKind) -> &mut Vec<[OneEuroFilter; 3]> {
        match kind {
            GroupKind::Pose => &mut self.pose,
            GroupKind::LeftHand => &mut self.left_hand,
            GroupKind::RightHand => &mut self.right_hand,
        }
    }
}

fn filter_group(
    group: &LandmarkGroup,
    filters: &mut [[OneEuroFilter; 3]],
    dt: f32,
) -> LandmarkGroup {
    group
        .iter()
        .zip(filters.iter_mut())
        .map(|(p, [fx, fy, fz])| {
            LandmarkPoint::new(fx.filter(p.x, dt), fy.filter(p.y, dt), fz.filter(p.z, dt))
        })
        .collect()
}
