//! Rigstream engine - lifecycle object owned by whoever drives the rig

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rigstream_core::{PoseFrame, RigConfig, RigResult, StalePolicy};
use rigstream_motion::{
    CoordinateMapper, JointHost, LandmarkSmoother, SmoothingEngine, TickReport,
};
use rigstream_state::{FrameCursor, LatestFrameStore};
use rigstream_transport::{
    ReceiverConfig, ReceiverHandle, ReceiverState, ReceiverStats, StreamReceiver,
};

#[derive(Clone, Debug, Default)]
pub struct EngineStats {
    pub ticks: u64,
    /// Fresh frames applied
    pub frames_consumed: u64,
    /// Frames superseded before any tick saw them
    pub frames_skipped: u64,
    pub joints_updated: u64,
    pub last_tick_duration: Duration,
}

/// Outcome of one [`RigEngine::tick`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineTick {
    pub report: TickReport,
    /// Sequence of the frame applied, if any
    pub applied_seq: Option<u64>,
    /// Whether the applied frame arrived since the previous tick
    pub fresh: bool,
    pub ticks_since_frame: u64,
}

/// Streaming ingestion + smoothing engine
pub struct RigEngine {
    config: RigConfig,
    store: Arc<LatestFrameStore>,
    receiver: Option<ReceiverHandle>,
    mapper: CoordinateMapper,
    smoother: SmoothingEngine,
    prefilter: Option<LandmarkSmoother>,
    cursor: FrameCursor,
    /// Last frame handed to the smoother, after any pre-filtering
    current: Option<(u64, Arc<PoseFrame>)>,
    ticks_since_frame: u64,
    stats: EngineStats,
}

impl RigEngine {
    /// Validate the configuration, bind the socket and start receiving.
    ///
    /// Configuration and bind failures are returned here, before any
    /// background work starts.
    pub async fn start(config: RigConfig) -> RigResult<Self> {
        let mut engine = Self::detached(config)?;

        let receiver = StreamReceiver::bind(
            ReceiverConfig::from(&engine.config),
            Arc::clone(&engine.store),
        )
        .await?;
        engine.receiver = Some(receiver.spawn());

        tracing::info!(
            addr = ?engine.local_addr(),
            smoothing_factor = engine.config.smoothing_factor,
            "rig engine started"
        );
        Ok(engine)
    }

    /// Engine without a network receiver; frames arrive through [`publish`](Self::publish)
    pub fn detached(config: RigConfig) -> RigResult<Self> {
        config.validate()?;

        let prefilter = config.landmark_filter.map(LandmarkSmoother::new).transpose()?;

        Ok(RigEngine {
            mapper: CoordinateMapper::from_config(&config),
            smoother: SmoothingEngine::from_config(&config)?,
            prefilter,
            store: Arc::new(LatestFrameStore::new()),
            receiver: None,
            cursor: FrameCursor::new(),
            current: None,
            ticks_since_frame: 0,
            stats: EngineStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    /// Shared handle to the latest-frame store
    pub fn store(&self) -> Arc<LatestFrameStore> {
        Arc::clone(&self.store)
    }

    /// Publish a frame directly, bypassing the network
    pub fn publish(&self, frame: PoseFrame) -> u64 {
        self.store.publish(frame)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.receiver.as_ref().map(ReceiverHandle::local_addr)
    }

    pub fn receiver_state(&self) -> Option<ReceiverState> {
        self.receiver.as_ref().map(ReceiverHandle::state)
    }

    pub fn receiver_stats(&self) -> Option<ReceiverStats> {
        self.receiver.as_ref().map(ReceiverHandle::stats)
    }

    /// Ticks since one last consumed a fresh frame
    pub fn ticks_since_last_frame(&self) -> u64 {
        self.ticks_since_frame
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Run one render tick against the host's joints.
    ///
    /// `dt` is the elapsed time in seconds since the previous tick. Never
    /// blocks on ingestion.
    pub fn tick<H: JointHost + ?Sized>(&mut self, dt: f32, host: &mut H) -> EngineTick {
        let started = Instant::now();
        self.stats.ticks += 1;

        let previous = self.cursor.last_seen();
        let fresh = match self.cursor.poll(&self.store) {
            Some(snapshot) => {
                self.ticks_since_frame = 0;
                self.stats.frames_consumed += 1;
                // Everything published between the two sequences was overwritten
                self.stats.frames_skipped += snapshot.seq.saturating_sub(previous + 1);

                let frame = match self.prefilter.as_mut() {
                    Some(filter) => Arc::new(filter.apply(&snapshot.frame, snapshot.published_at)),
                    None => snapshot.frame,
                };
                self.current = Some((snapshot.seq, frame));
                true
            }
            None => {
                self.ticks_since_frame += 1;
                false
            }
        };

        let applied = match (fresh, self.config.stale_policy) {
            (true, _) | (false, StalePolicy::Converge) => self.current.clone(),
            (false, StalePolicy::Hold) => None,
        };
        let applied_seq = applied.as_ref().map(|(seq, _)| *seq);

        let report = match applied {
            Some((_, frame)) => self.smoother.apply_frame(&frame, dt, &self.mapper, host),
            None => TickReport::default(),
        };

        self.stats.joints_updated += report.total() as u64;
        self.stats.last_tick_duration = started.elapsed();

        EngineTick {
            report,
            applied_seq,
            fresh,
            ticks_since_frame: self.ticks_since_frame,
        }
    }

    /// Stop the receiver and release the socket.
    ///
    /// Idempotent. The last published frame stays readable afterwards.
    pub async fn stop(&mut self) -> RigResult<Option<ReceiverStats>> {
        match self.receiver.as_mut() {
            Some(receiver) => {
                let stats = receiver.stop().await?;
                tracing::info!(
                    frames = stats.frames_published,
                    decode_failures = stats.decode_failures,
                    "rig engine stopped"
                );
                Ok(Some(stats))
            }
            None => Ok(None),
        }
    }
}
