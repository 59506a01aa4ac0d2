// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub chunking: ChunkingConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Directory scanned (non-recursively) for .pdf files.
    pub pdf_dir: PathBuf,
    /// Process only the first N documents; 0 means all.
    pub max_docs: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory receiving he_data_{model}.jsonl files.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters. Must be < chunk_size.
    pub overlap: usize,
    /// Split-retry floor: a chunk at or below this length is abandoned on
    /// parse failure instead of being halved again.
    pub min_split_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Wall-clock bound per chunk attempt. Reasoning models are slow;
    /// 240s+ recommended for ernie5.
    pub chunk_timeout_secs: u64,
    /// Chunk-level parallelism within one document. 1 keeps a hang
    /// attributable to a single chunk; 2+ may trigger throttling.
    pub chunk_workers: usize,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("HEA_EXTRACT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            input: InputConfig {
                pdf_dir: PathBuf::from("AMpdf"),
                max_docs: 0,
            },
            output: OutputConfig {
                dir: PathBuf::from("output"),
            },
            chunking: ChunkingConfig {
                chunk_size: 6000,
                overlap: 500,
                min_split_chars: 2000,
            },
            extraction: ExtractionConfig {
                chunk_timeout_secs: 240,
                chunk_workers: 1,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(PipelineError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }

        if self.extraction.chunk_workers == 0 {
            return Err(PipelineError::Config(
                "chunk_workers must be greater than 0".to_string(),
            ));
        }

        if self.extraction.chunk_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "chunk_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
