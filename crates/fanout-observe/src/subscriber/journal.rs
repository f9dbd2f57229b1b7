use fanout_core::Subscribe;
use fanout_model::PoolEvent;

use crate::subscriber::view::log_event;

/// Logs every pool event through `tracing`.
#[derive(Debug, Default)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for Journal {
    fn on_event(&self, event: &PoolEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}
