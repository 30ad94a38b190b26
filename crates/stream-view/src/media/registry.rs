use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::producer::Producer;

/// Non-owning handle to a producer held by a [`ProducerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProducerId(u64);

impl ProducerId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "producer#{}", self.0)
    }
}

/// Owns the producers; views refer to them only by [`ProducerId`].
///
/// Removing a producer here is enough to make every view that still holds
/// its id behave as detached.
pub struct ProducerRegistry<C> {
    next_id: AtomicU64,
    producers: RwLock<HashMap<ProducerId, Arc<dyn Producer<C>>>>,
}

impl<C> ProducerRegistry<C> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            producers: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, producer: Arc<dyn Producer<C>>) -> ProducerId {
        let id = ProducerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.producers.write().insert(id, producer);
        log::debug!("registered {id}");
        id
    }

    pub fn unregister(&self, id: ProducerId) -> Option<Arc<dyn Producer<C>>> {
        let removed = self.producers.write().remove(&id);
        if removed.is_some() {
            log::debug!("unregistered {id}");
        }
        removed
    }

    pub fn get(&self, id: ProducerId) -> Option<Arc<dyn Producer<C>>> {
        self.producers.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.producers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.read().is_empty()
    }
}

impl<C> Default for ProducerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ProducerRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
