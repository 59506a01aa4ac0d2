// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: batch orchestration

mod driver;
mod progress;

pub use driver::{BatchDriver, DocumentSummary};
pub use progress::{ProgressTracker, RunStats};
