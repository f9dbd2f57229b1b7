//! Data model shared by every fanout crate.
//!
//! Nothing in here performs I/O: templates, records, invocations, the run policy and
//! the outcome types an oversight task reports back to the pool.

mod error;
pub use error::ConfigError;

mod domain;
pub use domain::*;
