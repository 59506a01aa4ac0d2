// file: src/pdf/mod.rs
// description: pdf text collaborator module exports
// reference: binary-to-text extraction and boilerplate cleaning

pub mod cleaner;
pub mod reader;

pub use cleaner::{clean_paper_text, truncate_back_matter};
pub use reader::{extract_text, list_pdfs};
