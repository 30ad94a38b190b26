use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;

use super::types::Frame;

/// Single-slot, last-write-wins holder for the newest decoded frame.
///
/// Producers overwrite the slot from any thread; the display tick reads it.
/// Intermediate frames written between two reads are dropped.
#[derive(Debug, Default)]
pub struct FrameMailbox {
    slot: ArcSwapOption<Frame>,
    writes: AtomicU64,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame unconditionally.
    pub fn set(&self, frame: Arc<Frame>) {
        self.slot.store(Some(frame));
        self.writes.fetch_add(1, Ordering::Release);
    }

    /// The current frame, if any has been produced. Does not consume it.
    pub fn get(&self) -> Option<Arc<Frame>> {
        self.slot.load_full()
    }

    /// Total number of `set` calls so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }
}
