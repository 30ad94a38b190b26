use std::sync::Arc;

use parking_lot::Mutex;

use super::sink::FrameSink;
use crate::error::{Result, ViewError};
use crate::media::producer::Producer;
use crate::media::registry::{ProducerId, ProducerRegistry};
use crate::media::types::{CameraPosition, PositionCell};

/// Tracks which producer feeds a view and wires/unwires it.
///
/// Holds only a [`ProducerId`]; the registry owns the producer.
pub struct SurfaceBinding<C> {
    registry: Arc<ProducerRegistry<C>>,
    current: Option<ProducerId>,
    sink: FrameSink,
    position: Arc<PositionCell>,
    // Attach epoch. Held across the unbind in `switch_to` and across the
    // epoch check plus bind in the producer-side job.
    epoch: Arc<Mutex<u64>>,
}

impl<C: Send + Sync + 'static> SurfaceBinding<C> {
    pub fn new(registry: Arc<ProducerRegistry<C>>, sink: FrameSink) -> Self {
        Self {
            registry,
            current: None,
            sink,
            position: Arc::new(PositionCell::default()),
            epoch: Arc::new(Mutex::new(0)),
        }
    }

    /// Make `id` the view's producer, or detach with `None`.
    ///
    /// The previous producer is unbound immediately. The new one gets a fresh
    /// context from `make_context`, then, on its own queue, has its position
    /// recorded, the sink bound and `start_running` called. Attaching the
    /// same producer again repeats all of that, including the start.
    ///
    /// An unknown id fails with [`ViewError::UnknownProducer`] and leaves the
    /// binding untouched.
    pub fn attach(&mut self, id: Option<ProducerId>, make_context: impl FnOnce() -> C) -> Result<()> {
        let next = match id {
            Some(id) => {
                let producer = self.registry.get(id).ok_or(ViewError::UnknownProducer(id))?;
                Some((id, producer, make_context()))
            }
            None => None,
        };
        self.switch_to(next);
        Ok(())
    }

    pub fn detach(&mut self) {
        self.switch_to(None);
    }

    fn switch_to(&mut self, next: Option<(ProducerId, Arc<dyn Producer<C>>, C)>) {
        let epoch = {
            let mut guard = self.epoch.lock();
            *guard += 1;
            if let Some(old) = self.current.take() {
                if let Some(producer) = self.registry.get(old) {
                    producer.unbind();
                }
                log::debug!("detached {old}");
            }
            *guard
        };

        let Some((id, producer, context)) = next else {
            return;
        };
        producer.set_context(Some(Arc::new(context)));

        let sink = self.sink.clone();
        let position = self.position.clone();
        let current_epoch = self.epoch.clone();
        let job_producer = producer.clone();
        producer.dispatch(Box::new(move || {
            let reported = job_producer.position();
            {
                // A later attach/detach owns the binding now; don't clobber it.
                let guard = current_epoch.lock();
                if *guard == epoch {
                    position.set(reported);
                    job_producer.bind(sink);
                } else {
                    log::debug!("{id}: stale attach, not binding");
                }
            }
            job_producer.start_running();
        }));

        self.current = Some(id);
        log::debug!("attached {id}");
    }

    pub fn current(&self) -> Option<ProducerId> {
        self.current
    }

    /// Rendering context of the attached producer, if it is still registered.
    pub fn context(&self) -> Option<Arc<C>> {
        let id = self.current?;
        self.registry.get(id)?.context()
    }

    pub fn position(&self) -> CameraPosition {
        self.position.get()
    }

    pub fn sink(&self) -> &FrameSink {
        &self.sink
    }
}
