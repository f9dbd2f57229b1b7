mod oversight;
pub use oversight::oversee;

use std::sync::Arc;

use async_trait::async_trait;

use fanout_core::Runner;
use fanout_model::{Invocation, Policy, TaskId, TaskReport};

/// Runner that executes each invocation as a child process under [`oversee`].
pub struct ProcRunner {
    policy: Arc<Policy>,
}

impl ProcRunner {
    pub fn new(policy: Arc<Policy>) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Runner for ProcRunner {
    fn name(&self) -> &'static str {
        "proc"
    }

    async fn run(&self, id: TaskId, invocation: Invocation) -> TaskReport {
        oversee(&self.policy, id, &invocation).await
    }
}
