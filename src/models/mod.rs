// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod entity;
pub mod record;

pub use entity::{Element, MaterialEntity, MaterialRole, Processing, PropertyMeasurement};
pub use record::{CompositionRecord, ExtractionRecord, ProcessRecord, PropertyRecord, RawExtraction};
