mod error;
pub use error::{ExecError, ExecResult};

pub mod util;

#[cfg(feature = "proc")]
pub mod proc;
#[cfg(feature = "proc")]
pub use proc::{ProcRunner, oversee};

