//! Synthetic landmark producer
//!
//! Generates plausible tracker output without a camera:
//! - A standing skeleton swaying around the frame center
//! - Hands that drop in and out like a real hand tracker
//! - Per-landmark sensor noise
//! - Producer metrics (inference time, fps, intensity)
//!
//! Seeded, so every run of a test sees the same motion.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rigstream_core::{GroupKind, LandmarkGroup, LandmarkPoint, Metrics, PoseFrame};

/// Synthetic producer configuration
#[derive(Clone, Debug)]
pub struct ProducerConfig {
    /// Simulated capture rate
    pub fps: f32,
    /// Sway amplitude in normalized units
    pub sway: f32,
    /// Sway frequency (Hz)
    pub sway_hz: f32,
    /// Per-coordinate noise amplitude
    pub noise: f32,
    /// Probability that a hand is missing from a frame (0.0 - 1.0)
    pub hand_dropout: f64,
    /// Attach producer metrics to each frame
    pub metrics: bool,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        ProducerConfig {
            fps: 30.0,
            sway: 0.05,
            sway_hz: 0.5,
            noise: 0.002,
            hand_dropout: 0.1,
            metrics: true,
        }
    }
}

impl ProducerConfig {
    /// Subject standing perfectly still, every group always present
    pub fn still() -> Self {
        ProducerConfig {
            sway: 0.0,
            noise: 0.0,
            hand_dropout: 0.0,
            ..Default::default()
        }
    }

    /// Fast motion with a noisy tracker
    pub fn energetic() -> Self {
        ProducerConfig {
            sway: 0.2,
            sway_hz: 2.0,
            noise: 0.01,
            hand_dropout: 0.3,
            ..Default::default()
        }
    }
}

/// Seeded generator of [`PoseFrame`]s
pub struct SyntheticProducer {
    config: ProducerConfig,
    rng: StdRng,
    /// Simulated time (seconds)
    time: f32,
    frames: u64,
}

impl SyntheticProducer {
    pub fn new(config: ProducerConfig, seed: u64) -> Self {
        SyntheticProducer {
            config,
            rng: StdRng::seed_from_u64(seed),
            time: 0.0,
            frames: 0,
        }
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Frames generated so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated time of the last frame
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Interval between frames at the configured rate
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.config.fps.max(1.0)
    }

    /// Advance one capture interval and produce the next frame
    pub fn next_frame(&mut self) -> PoseFrame {
        self.time += self.frame_interval();
        self.frames += 1;

        let offset = self.config.sway * (self.time * self.config.sway_hz * TAU).sin();
        let pose = self.group(GroupKind::Pose, 0.5 + offset, 0.15, 0.0);
        let nose = pose.get(0).copied().unwrap_or_default();

        let mut frame = PoseFrame::new().with_group(GroupKind::Pose, pose);

        if !self.rng.gen_bool(self.config.hand_dropout) {
            let hand = self.group(GroupKind::LeftHand, 0.65 + offset, 0.45, -0.05);
            frame.set_group(GroupKind::LeftHand, Some(hand));
        }
        if !self.rng.gen_bool(self.config.hand_dropout) {
            let hand = self.group(GroupKind::RightHand, 0.35 + offset, 0.45, -0.05);
            frame.set_group(GroupKind::RightHand, Some(hand));
        }

        if self.config.metrics {
            let inference_ms = self.rng.gen_range(8.0..16.0);
            frame = frame.with_metrics(Metrics {
                inference_ms: Some(inference_ms),
                fps: Some(self.config.fps),
                // Same heuristic the tracker uses: nose distance from the sensor origin
                intensity: Some(nose.x.hypot(nose.y) * 10.0),
            });
        }

        frame
    }

    /// Landmarks laid out top to bottom starting at `(x, y)`
    fn group(&mut self, kind: GroupKind, x: f32, y: f32, z: f32) -> LandmarkGroup {
        let len = kind.nominal_len();
        let spacing = 0.6 / len as f32;
        let noise = self.config.noise;

        (0..len)
            .map(|i| {
                let jitter = |rng: &mut StdRng| {
                    if noise > 0.0 {
                        rng.gen_range(-noise..noise)
                    } else {
                        0.0
                    }
                };
                LandmarkPoint::new(
                    x + jitter(&mut self.rng),
                    y + i as f32 * spacing + jitter(&mut self.rng),
                    z + jitter(&mut self.rng),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_motion() {
        let mut a = SyntheticProducer::new(ProducerConfig::energetic(), 7);
        let mut b = SyntheticProducer::new(ProducerConfig::energetic(), 7);

        for _ in 0..50 {
            assert_eq!(a.next_frame(), b.next_frame());
        }
        assert_eq!(a.frames(), 50);
    }

    #[test]
    fn test_still_subject() {
        let mut producer = SyntheticProducer::new(ProducerConfig::still(), 1);
        let first = producer.next_frame();
        let second = producer.next_frame();

        assert_eq!(first.group(GroupKind::Pose), second.group(GroupKind::Pose));
        assert_eq!(first.landmark_count(), 33 + 21 + 21);
    }

    #[test]
    fn test_frames_are_finite_and_in_range() {
        let mut producer = SyntheticProducer::new(ProducerConfig::energetic(), 99);

        for _ in 0..200 {
            let frame = producer.next_frame();
            for (_, group) in frame.present_groups() {
                for p in group.iter() {
                    assert!(p.is_finite());
                    assert!(p.x > -0.5 && p.x < 1.5);
                    assert!(p.y > -0.5 && p.y < 1.5);
                }
            }
            let metrics = frame.metrics.unwrap();
            assert!(metrics.intensity.unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_hand_dropout() {
        let config = ProducerConfig {
            hand_dropout: 0.5,
            ..Default::default()
        };
        let mut producer = SyntheticProducer::new(config, 3);

        let missing = (0..400)
            .map(|_| producer.next_frame())
            .filter(|f| f.group(GroupKind::LeftHand).is_none())
            .count();

        // Roughly half, pose always present
        assert!(missing > 120 && missing < 280, "missing {}", missing);
    }
}
