use std::sync::Arc;

use fanout_model::PoolEvent;

/// Receives pool lifecycle events.
///
/// Called inline from the supervisor and the reaper, so implementations must not block.
pub trait Subscribe: Send + Sync {
    fn on_event(&self, event: &PoolEvent);

    fn name(&self) -> &'static str;
}

/// Cheap-to-clone fan-out over registered subscribers.
#[derive(Clone, Default)]
pub struct Subscribers {
    inner: Arc<[Arc<dyn Subscribe>]>,
}

impl Subscribers {
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            inner: subscribers.into(),
        }
    }

    #[inline]
    pub fn publish(&self, event: PoolEvent) {
        for sub in self.inner.iter() {
            sub.on_event(&event);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
