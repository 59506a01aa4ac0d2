// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod aggregator;
pub mod chunker;
pub mod config;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod utils;

pub use aggregator::{AggregationResult, UNASSIGNED_KEY, group_records};
pub use chunker::{Chunk, chunk_text};
pub use config::{ChunkingConfig, Config, ExtractionConfig, InputConfig, OutputConfig};
pub use error::{PipelineError, Result, SkipReason};
pub use exporter::{JsonlSink, entity_to_target_json};
pub use extractor::{
    ChatCompletionsClient, ChunkOutcome, ChunkSkip, ExtractionBackend, ModelProfile,
    RetryController, get_model_config,
};
pub use models::{
    Element, ExtractionRecord, MaterialEntity, MaterialRole, Processing, PropertyMeasurement,
};
pub use pipeline::{BatchDriver, DocumentSummary, ProgressTracker, RunStats};
