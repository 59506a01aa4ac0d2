// file: src/extractor/mod.rs
// description: extraction module exports and public api
// reference: backend client, model registry, prompt and retry controller

pub mod client;
pub mod controller;
pub mod profiles;
pub mod prompt;

pub use client::{ChatCompletionsClient, ExtractionBackend};
pub use controller::{ChunkOutcome, ChunkSkip, RetryController};
pub use profiles::{ModelProfile, get_model_config};
