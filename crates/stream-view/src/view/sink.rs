use std::sync::Arc;

use crate::media::mailbox::FrameMailbox;
use crate::media::types::Frame;

type NeedsDisplay = Arc<dyn Fn() + Send + Sync>;

/// The handle a producer draws into.
///
/// `draw` drops the frame into the view's mailbox and asks the owner for a
/// display tick. It never blocks; bursts coalesce to the newest frame.
#[derive(Clone)]
pub struct FrameSink {
    mailbox: Arc<FrameMailbox>,
    needs_display: NeedsDisplay,
}

impl FrameSink {
    pub fn new(mailbox: Arc<FrameMailbox>, needs_display: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            mailbox,
            needs_display: Arc::new(needs_display),
        }
    }

    pub fn draw(&self, frame: Frame) {
        self.mailbox.set(Arc::new(frame));
        (self.needs_display)();
    }

    /// Whether both sinks feed the same view.
    pub fn same_target(&self, other: &FrameSink) -> bool {
        Arc::ptr_eq(&self.mailbox, &other.mailbox)
    }
}

impl std::fmt::Debug for FrameSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSink")
            .field("writes", &self.mailbox.writes())
            .finish_non_exhaustive()
    }
}
