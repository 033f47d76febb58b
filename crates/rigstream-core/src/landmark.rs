//! Landmark frames - what the tracking producer reports
//!
//! Coordinates here are in sensor space: x/y normalized to roughly [0, 1]
//! with y pointing down, z an unconstrained relative depth.

use std::fmt;

/// Landmark group identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKind {
    /// Full-body pose skeleton
    Pose,
    LeftHand,
    RightHand,
}

impl GroupKind {
    /// All groups in wire order
    pub fn all() -> &'static [GroupKind] {
        &[GroupKind::Pose, GroupKind::LeftHand, GroupKind::RightHand]
    }

    /// Number of landmarks the producer emits for this group
    pub fn nominal_len(self) -> usize {
        match self {
            GroupKind::Pose => 33,
            GroupKind::LeftHand | GroupKind::RightHand => 21,
        }
    }

    /// Field name used on the wire
    pub fn wire_name(self) -> &'static str {
        match self {
            GroupKind::Pose => "pose",
            GroupKind::LeftHand => "left_hand",
            GroupKind::RightHand => "right_hand",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A single tracked point in sensor space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for LandmarkPoint {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmarks of one tracked structure.
///
/// Index `i` addresses joint slot `i` of the matching host array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkGroup {
    points: Vec<LandmarkPoint>,
}

impl LandmarkGroup {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LandmarkPoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LandmarkPoint> {
        self.points.iter()
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }
}

impl FromIterator<LandmarkPoint> for LandmarkGroup {
    fn from_iter<I: IntoIterator<Item = LandmarkPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Producer-side performance figures. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    /// Inference latency in milliseconds
    pub inference_ms: Option<f32>,
    /// Producer frame rate
    pub fps: Option<f32>,
    /// Movement intensity heuristic
    pub intensity: Option<f32>,
}

/// One snapshot of the groups available at one point in time.
///
/// A missing group means "no update for this group", never "reset it".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseFrame {
    pub pose: Option<LandmarkGroup>,
    pub left_hand: Option<LandmarkGroup>,
    pub right_hand: Option<LandmarkGroup>,
    pub metrics: Option<Metrics>,
}

impl PoseFrame {
    /// Create a frame with no groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a group by kind
    pub fn group(&self, kind: GroupKind) -> Option<&LandmarkGroup> {
        match kind {
            GroupKind::Pose => self.pose.as_ref(),
            GroupKind::LeftHand => self.left_hand.as_ref(),
            GroupKind::RightHand => self.right_hand.as_ref(),
        }
    }

    /// Set a group by kind
    pub fn set_group(&mut self, kind: GroupKind, group: Option<LandmarkGroup>) {
        match kind {
            GroupKind::Pose => self.pose = group,
            GroupKind::LeftHand => self.left_hand = group,
            GroupKind::RightHand => self.right_hand = group,
        }
    }

    pub fn with_group(mut self, kind: GroupKind, group: LandmarkGroup) -> Self {
        self.set_group(kind, Some(group));
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Groups carried by this frame, in wire order
    pub fn present_groups(&self) -> impl Iterator<Item = (GroupKind, &LandmarkGroup)> {
        GroupKind::all()
            .iter()
            .filter_map(move |&kind| self.group(kind).map(|g| (kind, g)))
    }

    /// True when the frame updates nothing
    pub fn is_empty(&self) -> bool {
        self.present_groups().next().is_none()
    }

    /// Total landmark count across present groups
    pub fn landmark_count(&self) -> usize {
        self.present_groups().map(|(_, g)| g.len()).sum()
    }
}
