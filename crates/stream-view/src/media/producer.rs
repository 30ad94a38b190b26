use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;

use super::queue::{Job, SerialQueue};
use super::types::{CameraPosition, Frame};
use crate::error::Result;
use crate::view::sink::FrameSink;

/// What a view needs from an upstream frame producer.
///
/// `C` is the rendering context type of the surface the producer draws
/// into; the view hands one over on attach and reads it back every tick.
pub trait Producer<C>: Send + Sync {
    fn position(&self) -> CameraPosition;

    fn set_context(&self, context: Option<Arc<C>>);

    fn context(&self) -> Option<Arc<C>>;

    /// Start pushing frames into `sink`.
    fn bind(&self, sink: FrameSink);

    /// Stop pushing frames anywhere.
    fn unbind(&self);

    fn start_running(&self);

    /// Run `job` on the producer's serial execution context.
    fn dispatch(&self, job: Job);
}

/// Stock producer: a serial worker plus lock-free drawable/context fields.
///
/// Frames pushed while not running, or while no sink is bound, are dropped.
pub struct StreamProducer<C> {
    name: String,
    position: CameraPosition,
    queue: SerialQueue,
    drawable: ArcSwapOption<FrameSink>,
    context: ArcSwapOption<C>,
    running: AtomicBool,
    starts: AtomicUsize,
}

impl<C> StreamProducer<C> {
    pub fn new(name: &str, position: CameraPosition) -> Result<Self> {
        let queue = SerialQueue::new(&format!("{name}-queue"))?;
        Ok(Self {
            name: name.to_string(),
            position,
            queue,
            drawable: ArcSwapOption::empty(),
            context: ArcSwapOption::empty(),
            running: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
        })
    }

    /// Forward a frame to the bound sink. Returns whether it was delivered.
    pub fn push_frame(&self, frame: Frame) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.drawable.load().as_ref() {
            Some(sink) => {
                sink.draw(frame);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop_running(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            log::info!("{}: stopped", self.name);
        }
    }

    pub fn is_bound(&self) -> bool {
        self.drawable.load().is_some()
    }

    /// Whether the bound sink feeds the same view as `sink`.
    pub fn is_bound_to(&self, sink: &FrameSink) -> bool {
        self.drawable
            .load()
            .as_ref()
            .is_some_and(|bound| bound.same_target(sink))
    }

    /// How many times `start_running` has been called.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::Acquire)
    }

    /// Block until all work dispatched so far has run.
    pub fn wait_idle(&self) {
        self.queue.barrier();
    }
}

impl<C: Send + Sync> Producer<C> for StreamProducer<C> {
    fn position(&self) -> CameraPosition {
        self.position
    }

    fn set_context(&self, context: Option<Arc<C>>) {
        self.context.store(context);
    }

    fn context(&self) -> Option<Arc<C>> {
        self.context.load_full()
    }

    fn bind(&self, sink: FrameSink) {
        self.drawable.store(Some(Arc::new(sink)));
    }

    fn unbind(&self) {
        self.drawable.store(None);
    }

    fn start_running(&self) {
        self.starts.fetch_add(1, Ordering::AcqRel);
        if !self.running.swap(true, Ordering::AcqRel) {
            log::info!("{}: running", self.name);
        }
    }

    fn dispatch(&self, job: Job) {
        self.queue.dispatch(job);
    }
}

impl<C> std::fmt::Debug for StreamProducer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamProducer")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("running", &self.is_running())
            .field("bound", &self.is_bound())
            .finish_non_exhaustive()
    }
}
