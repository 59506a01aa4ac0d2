// file: src/exporter/mod.rs
// description: exporter module exports
// reference: target JSON mapping and append-only JSONL sink

pub mod jsonl;
pub mod template;

pub use jsonl::JsonlSink;
pub use template::entity_to_target_json;
