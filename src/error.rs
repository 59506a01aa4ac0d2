// file: src/error.rs
// description: Custom error types, skip reasons and result type aliases
// reference: https://docs.rs/thiserror

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown model: {0} (supported: ernie5, ernie4, deepseek, qwen, kimi, gemini)")]
    UnknownModel(String),

    #[error("PDF extraction failed for {path}: {message}")]
    PdfExtract { path: PathBuf, message: String },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Chunk extraction timed out after {0}s")]
    Timeout(u64),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend rate limited: {0}")]
    RateLimited(String),

    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Map a chunk-local failure to the skip reason recorded in accounting.
    /// Fatal/startup errors have no skip reason and must not reach the
    /// controller in the first place.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            PipelineError::Timeout(_) => Some(SkipReason::Timeout),
            PipelineError::Parse(_) => Some(SkipReason::ParseFailure),
            PipelineError::Transport(_) | PipelineError::RateLimited(_) => {
                Some(SkipReason::TransportError)
            }
            _ => None,
        }
    }
}

/// Observability tag recorded when a chunk is abandoned instead of
/// raising a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Timeout,
    ParseFailure,
    TransportError,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Timeout => write!(f, "timeout"),
            SkipReason::ParseFailure => write!(f, "parse_failure"),
            SkipReason::TransportError => write!(f, "transport_error"),
        }
    }
}
