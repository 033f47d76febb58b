//! End-to-end loopback integration
//!
//! Runs the real receiver on a loopback socket and drives an in-memory rig:
//! - Synthetic streams reaching the rig
//! - Malformed datagrams leaving the last good frame in place
//! - Hostile delivery never corrupting joint state
//! - Shutdown releasing the socket

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rigstream_core::{RigConfig, RigError, RigResult};
use rigstream_motion::JointRig;
use rigstream_runtime::{EngineTick, RigEngine};
use rigstream_state::LatestFrameStore;
use rigstream_transport::ReceiverStats;

/// A running engine on loopback plus the rig it drives
pub struct LoopbackHarness {
    engine: RigEngine,
    rig: JointRig,
    addr: SocketAddr,
}

impl LoopbackHarness {
    /// Start on 127.0.0.1 with an ephemeral port
    pub async fn start() -> RigResult<Self> {
        Self::with_config(RigConfig::loopback()).await
    }

    pub async fn with_config(config: RigConfig) -> RigResult<Self> {
        let engine = RigEngine::start(config).await?;
        let addr = engine
            .local_addr()
            .ok_or_else(|| RigError::SocketError("engine has no receiver".into()))?;
        let rig = JointRig::from_config(engine.config());

        Ok(LoopbackHarness { engine, rig, addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn rig(&self) -> &JointRig {
        &self.rig
    }

    pub fn engine(&self) -> &RigEngine {
        &self.engine
    }

    pub fn store(&self) -> Arc<LatestFrameStore> {
        self.engine.store()
    }

    pub fn tick(&mut self, dt: f32) -> EngineTick {
        self.engine.tick(dt, &mut self.rig)
    }

    /// Tick `n` times at a fixed `dt`
    pub fn run_ticks(&mut self, n: usize, dt: f32) -> Vec<EngineTick> {
        (0..n).map(|_| self.tick(dt)).collect()
    }

    /// Wait until the receiver has counted `count` datagrams
    pub async fn wait_for_datagrams(&self, count: u64, timeout: Duration) -> bool {
        self.wait_until(timeout, |stats| stats.datagrams >= count).await
    }

    /// Poll receiver stats until `done` holds or the timeout expires
    pub async fn wait_until<F>(&self, timeout: Duration, done: F) -> bool
    where
        F: Fn(&ReceiverStats) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(stats) = self.engine.receiver_stats() {
                if done(&stats) {
                    return true;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub async fn stop(&mut self) -> RigResult<Option<ReceiverStats>> {
        self.engine.stop().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{malformed_corpus, ChaosConfig, ChaosSender, ProducerConfig, SyntheticProducer};
    use rigstream_core::{GroupKind, LandmarkGroup, LandmarkPoint, PoseFrame, StalePolicy};
    use rigstream_motion::CoordinateMapper;
    use rigstream_transport::{PoseTransmitter, ReceiverState};

    const WAIT: Duration = Duration::from_secs(5);

    fn assert_rig_tracks(rig: &JointRig, frame: &PoseFrame, tolerance: f32) {
        let mapper = CoordinateMapper::default();
        for (kind, group) in frame.present_groups() {
            for (i, landmark) in group.iter().enumerate() {
                let target = mapper.map(landmark);
                let joint = rig.get(kind, i).unwrap();
                assert!(
                    joint.distance(&target) <= tolerance,
                    "{}[{}] at {:?}, target {:?}",
                    kind,
                    i,
                    joint,
                    target
                );
            }
        }
    }

    fn uniform_frame(v: f32) -> PoseFrame {
        let group = |n: usize| -> LandmarkGroup {
            (0..n).map(|_| LandmarkPoint::new(v, v, v)).collect()
        };
        PoseFrame::new()
            .with_group(GroupKind::Pose, group(33))
            .with_group(GroupKind::LeftHand, group(21))
            .with_group(GroupKind::RightHand, group(21))
    }

    #[tokio::test]
    async fn test_synthetic_stream_reaches_rig() {
        let mut harness = LoopbackHarness::start().await.unwrap();
        let tx = PoseTransmitter::connect(harness.addr()).await.unwrap();
        let mut producer = SyntheticProducer::new(ProducerConfig::still(), 11);

        let mut last = PoseFrame::new();
        for _ in 0..30 {
            last = producer.next_frame();
            tx.send_frame(&last).await.unwrap();
        }

        assert!(harness.wait_for_datagrams(30, WAIT).await);
        assert_eq!(harness.store().read().as_deref(), Some(&last));

        let ticks = harness.run_ticks(120, 1.0 / 60.0);
        assert!(ticks[0].fresh);
        assert!(ticks[1..].iter().all(|t| !t.fresh));
        assert_eq!(ticks[119].ticks_since_frame, 119);

        // Hold policy: one application at blend 0.25 from the origin
        let first = harness.rig().get(GroupKind::Pose, 0).unwrap();
        let target = CoordinateMapper::default().map(last.pose.as_ref().unwrap().get(0).unwrap());
        assert!((first.x - target.x * 0.25).abs() < 1e-5);

        let stats = harness.stop().await.unwrap().unwrap();
        assert_eq!(stats.frames_published, 30);
        assert_eq!(stats.decode_failures, 0);
    }

    #[tokio::test]
    async fn test_converge_policy_settles_on_last_frame() {
        let config = RigConfig {
            stale_policy: StalePolicy::Converge,
            ..RigConfig::loopback()
        };
        let mut harness = LoopbackHarness::with_config(config).await.unwrap();
        let tx = PoseTransmitter::connect(harness.addr()).await.unwrap();
        let mut producer = SyntheticProducer::new(ProducerConfig::still(), 5);

        let frame = producer.next_frame();
        tx.send_frame(&frame).await.unwrap();
        assert!(harness.wait_for_datagrams(1, WAIT).await);

        harness.run_ticks(240, 1.0 / 60.0);
        assert_rig_tracks(harness.rig(), &frame, 1e-4);
        harness.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_datagrams_keep_last_good_frame() {
        let mut harness = LoopbackHarness::start().await.unwrap();
        let tx = PoseTransmitter::connect(harness.addr()).await.unwrap();

        let good = uniform_frame(0.25);
        tx.send_frame(&good).await.unwrap();
        assert!(harness.wait_for_datagrams(1, WAIT).await);
        let seq = harness.store().sequence();

        let corpus = malformed_corpus();
        for case in &corpus {
            tx.send_bytes(&case.bytes).await.unwrap();
        }

        let expected = 1 + corpus.len() as u64;
        assert!(harness.wait_for_datagrams(expected, WAIT).await);

        let stats = harness.engine().receiver_stats().unwrap();
        assert_eq!(stats.frames_published, 1);
        assert_eq!(stats.decode_failures, corpus.len() as u64);
        assert!(stats.last_decode_error.is_some());
        assert_eq!(harness.engine().receiver_state(), Some(ReceiverState::Running));

        assert_eq!(harness.store().sequence(), seq);
        assert_eq!(harness.store().read().as_deref(), Some(&good));

        // Still accepting after the garbage
        let next = uniform_frame(0.75);
        tx.send_frame(&next).await.unwrap();
        assert!(harness.wait_for_datagrams(expected + 1, WAIT).await);
        assert_eq!(harness.store().read().as_deref(), Some(&next));

        harness.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_hostile_link_never_corrupts_rig() {
        let mut harness = LoopbackHarness::start().await.unwrap();
        let mut sender = ChaosSender::connect(harness.addr(), ChaosConfig::hostile(), 2024)
            .await
            .unwrap();
        let mut producer = SyntheticProducer::new(ProducerConfig::energetic(), 2024);

        for _ in 0..300 {
            sender.send_frame(&producer.next_frame()).await.unwrap();
            harness.tick(1.0 / 60.0);
            tokio::task::yield_now().await;
        }
        sender.flush().await.unwrap();

        let sent = sender.stats().datagrams_sent;
        assert!(harness.wait_for_datagrams(sent, WAIT).await);

        let stats = harness.engine().receiver_stats().unwrap();
        assert_eq!(stats.frames_published + stats.decode_failures, stats.datagrams);
        assert!(stats.decode_failures > 0);
        assert!(stats.frames_published >= sender.stats().intact);
        assert_eq!(harness.engine().receiver_state(), Some(ReceiverState::Running));

        harness.run_ticks(60, 1.0 / 60.0);
        for kind in GroupKind::all() {
            assert!(harness.rig().positions(*kind).iter().all(|p| p.is_finite()));
        }

        // Every stored frame decoded cleanly
        let latest = harness.store().read().unwrap();
        assert!(latest.present_groups().all(|(_, g)| g.iter().all(|p| p.is_finite())));

        harness.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_releases_port_and_keeps_frame() {
        let mut harness = LoopbackHarness::start().await.unwrap();
        let addr = harness.addr();
        let tx = PoseTransmitter::connect(addr).await.unwrap();

        let frame = uniform_frame(0.5);
        tx.send_frame(&frame).await.unwrap();
        assert!(harness.wait_for_datagrams(1, WAIT).await);

        harness.stop().await.unwrap();
        assert_eq!(harness.engine().receiver_state(), Some(ReceiverState::Stopped));
        assert!(harness.stop().await.is_ok());

        // Frame survives shutdown, port is free again
        assert_eq!(harness.store().read().as_deref(), Some(&frame));
        let config = RigConfig {
            port: addr.port(),
            ..RigConfig::loopback()
        };
        let mut second = LoopbackHarness::with_config(config).await.unwrap();
        assert_eq!(second.addr(), addr);
        second.stop().await.unwrap();
    }

    #[test]
    fn test_store_never_tears_under_concurrent_ticks() {
        let mut engine = RigEngine::detached(RigConfig::default()).unwrap();
        let store = engine.store();
        let mut rig = JointRig::from_config(engine.config());

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..3_000 {
                    store.publish(uniform_frame((i % 100) as f32 / 100.0));
                }
            });

            for _ in 0..3_000 {
                // Each frame holds one value; a torn read would mix two
                if let Some(frame) = store.read() {
                    let first = frame.pose.as_ref().unwrap().get(0).copied().unwrap();
                    assert!(frame
                        .present_groups()
                        .all(|(_, g)| g.iter().all(|p| *p == first)));
                }

                // Instant blend puts every joint of a group on one target
                let tick = engine.tick(1.0, &mut rig);
                if tick.fresh {
                    let pose = rig.positions(GroupKind::Pose);
                    assert!(pose.iter().all(|p| *p == pose[0]));
                }
            }
        });

        assert_eq!(store.sequence(), 3_000);
    }
}
