mod template;
pub use template::{CommandTemplate, Token};

mod record;
pub use record::InputRecord;

mod invocation;
pub use invocation::Invocation;

mod policy;
pub use policy::{ExitFilter, Policy, PolicyBuilder, DEFAULT_MAX_RERUNS};

mod outcome;
pub use outcome::{ExitOutcome, SPAWN_FAILED_STATUS, TaskReport, Verdict};

mod task_id;
pub use task_id::TaskId;

mod child;
pub use child::ChildEntry;

mod event;
pub use event::{Collector, PoolEvent};
