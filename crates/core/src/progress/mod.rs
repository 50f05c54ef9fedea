//! Per-job progress reporting.
//!
//! Stages publish ordered, human-readable [`ProgressEvent`]s through a
//! [`ProgressHandle`]; any number of observers (UI, log recorder) subscribe
//! through the job's [`ProgressBus`]. Emission never blocks the pipeline: a
//! slow observer lags and drops old events instead of stalling producers.

mod bus;
mod events;

pub use bus::{ProgressBus, ProgressHandle};
pub use events::{ProgressEvent, StageName};
