//! Consumer-side cursor over the latest-frame store

use crate::{FrameSnapshot, LatestFrameStore};

/// Remembers the last sequence a consumer acted on
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCursor {
    last_seq: u64,
}

impl FrameCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the latest snapshot only if it is newer than the last one seen.
    ///
    /// Frames published between two polls are skipped, not queued.
    pub fn poll(&mut self, store: &LatestFrameStore) -> Option<FrameSnapshot> {
        let snapshot = store.snapshot()?;
        if snapshot.seq <= self.last_seq {
            return None;
        }
        self.last_seq = snapshot.seq;
        Some(snapshot)
    }

    /// Sequence of the last snapshot returned by [`poll`](Self::poll)
    pub fn last_seen(&self) -> u64 {
        self.last_seq
    }

    /// Frames published but never observed through this cursor
    pub fn skipped(&self, store: &LatestFrameStore) -> u64 {
        store.sequence().saturating_sub(self.last_seq)
    }
}
