//! Concurrency-bounded batch execution.

mod config;
mod error;
#[allow(clippy::module_inception)]
mod queue;
mod types;

pub use config::QueueConfig;
pub use error::QueueError;
pub use queue::BatchQueue;
pub use types::{JobStatusReport, QueueStatus};
