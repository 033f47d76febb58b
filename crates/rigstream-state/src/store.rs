//! Latest-frame store - single-slot, last-write-wins
//!
//! The publisher builds the whole snapshot before taking the lock and the
//! slot only ever swaps one `Arc`, so readers see either the previous frame
//! or the new one in full.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rigstream_core::PoseFrame;

/// A published frame plus its publication metadata
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    /// Publication sequence, starting at 1
    pub seq: u64,
    /// When the frame was published
    pub published_at: Instant,
    pub frame: Arc<PoseFrame>,
}

impl FrameSnapshot {
    pub fn age(&self) -> Duration {
        self.published_at.elapsed()
    }
}

#[derive(Debug, Default)]
struct Slot {
    latest: Option<FrameSnapshot>,
    published: u64,
}

/// Holder for the most recently decoded frame
#[derive(Debug, Default)]
pub struct LatestFrameStore {
    slot: RwLock<Slot>,
}

impl LatestFrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held frame, returning its sequence number
    pub fn publish(&self, frame: PoseFrame) -> u64 {
        let frame = Arc::new(frame);
        let published_at = Instant::now();

        let seq = {
            let mut slot = self.slot.write();
            slot.published += 1;
            let seq = slot.published;
            slot.latest = Some(FrameSnapshot {
                seq,
                published_at,
                frame,
            });
            seq
        };

        tracing::trace!(seq, "frame published");
        seq
    }

    /// Most recently published frame, if any
    pub fn read(&self) -> Option<Arc<PoseFrame>> {
        self.slot.read().latest.as_ref().map(|s| Arc::clone(&s.frame))
    }

    /// Most recently published frame with its metadata
    pub fn snapshot(&self) -> Option<FrameSnapshot> {
        self.slot.read().latest.clone()
    }

    /// Number of frames published so far
    pub fn sequence(&self) -> u64 {
        self.slot.read().published
    }

    pub fn is_empty(&self) -> bool {
        self.slot.read().latest.is_none()
    }

    /// Time since the last publish
    pub fn age(&self) -> Option<Duration> {
        self.slot.read().latest.as_ref().map(FrameSnapshot::age)
    }
}
