//! Per-job scratch directory management.
//!
//! Every job owns one [`ArtifactStore`]: a unique scratch directory holding
//! all intermediate files (audio track, downloaded images, raw slideshow,
//! subtitle file). Files are either promoted into the job's output directory
//! or deleted by `release()`, which runs on every exit path - no orphaned
//! temp files survive a terminal job.

mod error;
mod store;

pub use error::ArtifactError;
pub use store::ArtifactStore;
