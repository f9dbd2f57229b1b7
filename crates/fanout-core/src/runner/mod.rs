use async_trait::async_trait;

use fanout_model::{Invocation, TaskId, TaskReport};

/// Runs one oversight task to completion.
///
/// The supervisor calls [`Runner::run`] once per input record on its own tokio task.
/// The returned future owns the whole spawn / wait / evaluate / rerun cycle and resolves
/// only when the invocation is finished; its report is the single completion signal the
/// pool sees for that task.
#[async_trait]
pub trait Runner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, id: TaskId, invocation: Invocation) -> TaskReport;
}
