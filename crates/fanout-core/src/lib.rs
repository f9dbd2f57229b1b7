pub mod error;
pub use error::CoreError;

pub mod expand;
pub use expand::expand;

pub mod reaper;
pub use reaper::{Reaper, SyncWait};

pub mod runner;
pub use runner::Runner;

pub mod source;
pub use source::LineSource;

pub mod state;
pub use state::{ChildTable, TableStats};

pub mod subscribe;
pub use subscribe::{Subscribe, Subscribers};

pub mod supervisor;
pub use supervisor::{RunSummary, Supervisor};
