//! Host-side joint storage
//!
//! The rendering host owns the skeleton. The engine only sees it through
//! [`JointHost`]: one position array per group, addressed by landmark index.

use rigstream_core::{GroupKind, RigConfig, WorldPosition};

/// Joint arrays exposed by the rendering host
pub trait JointHost {
    /// Current positions for a group; slot `i` receives landmark `i`
    fn current_targets(&self, group: GroupKind) -> &[WorldPosition];

    /// Write a new position into one slot
    fn apply(&mut self, group: GroupKind, index: usize, position: WorldPosition);
}

impl<H: JointHost + ?Sized> JointHost for &mut H {
    fn current_targets(&self, group: GroupKind) -> &[WorldPosition] {
        (**self).current_targets(group)
    }

    fn apply(&mut self, group: GroupKind, index: usize, position: WorldPosition) {
        (**self).apply(group, index, position)
    }
}

/// Plain in-memory rig, one position per joint slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointRig {
    pose: Vec<WorldPosition>,
    left_hand: Vec<WorldPosition>,
    right_hand: Vec<WorldPosition>,
}

impl JointRig {
    /// Rig with every slot at the origin
    pub fn new(pose_slots: usize, left_hand_slots: usize, right_hand_slots: usize) -> Self {
        JointRig {
            pose: vec![WorldPosition::ORIGIN; pose_slots],
            left_hand: vec![WorldPosition::ORIGIN; left_hand_slots],
            right_hand: vec![WorldPosition::ORIGIN; right_hand_slots],
        }
    }

    pub fn from_config(config: &RigConfig) -> Self {
        Self::new(
            config.slot_count(GroupKind::Pose),
            config.slot_count(GroupKind::LeftHand),
            config.slot_count(GroupKind::RightHand),
        )
    }

    pub fn positions(&self, group: GroupKind) -> &[WorldPosition] {
        match group {
            GroupKind::Pose => &self.pose,
            GroupKind::LeftHand => &self.left_hand,
            GroupKind::RightHand => &self.right_hand,
        }
    }

    fn positions_mut(&mut self, group: GroupKind) -> &mut Vec<WorldPosition> {
        match group {
            GroupKind::Pose => &mut self.pose,
            GroupKind::LeftHand => &mut self.left_hand,
            GroupKind::RightHand => &mut self.right_hand,
        }
    }

    pub fn get(&self, group: GroupKind, index: usize) -> Option<WorldPosition> {
        self.positions(group).get(index).copied()
    }

    /// Set every slot of a group to `position`
    pub fn fill(&mut self, group: GroupKind, position: WorldPosition) {
        self.positions_mut(group).fill(position);
    }

    pub fn slot_count(&self, group: GroupKind) -> usize {
        self.positions(group).len()
    }
}

impl JointHost for JointRig {
    fn current_targets(&self, group: GroupKind) -> &[WorldPosition] {
        self.positions(group)
    }

    fn apply(&mut self, group: GroupKind, index: usize, position: WorldPosition) {
        if let Some(slot) = self.positions_mut(group).get_mut(index) {
            *slot = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_from_config() {
        let rig = JointRig::from_config(&RigConfig::default());
        assert_eq!(rig.slot_count(GroupKind::Pose), 33);
        assert_eq!(rig.slot_count(GroupKind::LeftHand), 21);
        assert_eq!(rig.slot_count(GroupKind::RightHand), 21);
    }

    #[test]
    fn test_apply_out_of_range_is_ignored() {
        let mut rig = JointRig::new(2, 0, 1);
        rig.apply(GroupKind::Pose, 1, WorldPosition::new(1.0, 2.0, 3.0));
        rig.apply(GroupKind::Pose, 5, WorldPosition::new(9.0, 9.0, 9.0));
        rig.apply(GroupKind::LeftHand, 0, WorldPosition::new(9.0, 9.0, 9.0));

        assert_eq!(rig.get(GroupKind::Pose, 1), Some(WorldPosition::new(1.0, 2.0, 3.0)));
        assert_eq!(rig.slot_count(GroupKind::Pose), 2);
        assert!(rig.positions(GroupKind::LeftHand).is_empty());
    }
}
