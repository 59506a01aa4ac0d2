// file: src/main.rs
// description: commandline application entry point
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use hea_extract::{BatchDriver, ChatCompletionsClient, Config, get_model_config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hea_extract")]
#[command(version = "0.1.0")]
#[command(
    about = "Chunked LLM extraction of composition/process/property records from alloy papers",
    long_about = None
)]
struct Cli {
    /// Backend model to extract with
    #[arg(
        long,
        default_value = "ernie4",
        value_parser = ["ernie5", "ernie4", "deepseek", "qwen", "kimi", "gemini"]
    )]
    model: String,

    /// Process at most N PDFs (0 = all)
    #[arg(long, value_name = "NUM")]
    max: Option<usize>,

    /// Chunk size in characters
    #[arg(long, value_name = "CHARS")]
    chunk: Option<usize>,

    /// Chunk-level parallelism within one document
    #[arg(long, value_name = "NUM")]
    workers: Option<usize>,

    /// Directory containing the input PDFs
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    hea_extract::utils::logging::init_logger(cli.color, cli.verbose);

    info!("HEA extraction pipeline");

    let mut config = if cli.config.exists() {
        info!("Loading configuration from: {}", cli.config.display());
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using built-in defaults",
            cli.config.display()
        );
        Config::default_config()
    };

    if let Some(max) = cli.max {
        config.input.max_docs = max;
    }
    if let Some(chunk) = cli.chunk {
        config.chunking.chunk_size = chunk;
    }
    if let Some(workers) = cli.workers {
        config.extraction.chunk_workers = workers;
    }
    if let Some(input) = cli.input {
        config.input.pdf_dir = input;
    }
    config.validate().context("Invalid configuration")?;

    // Startup failures (unknown model, missing credential) are fatal here;
    // everything past this point degrades to per-chunk or per-document skips.
    let profile = get_model_config(&cli.model)?;
    info!(
        "Model: {} ({}), chunk_size: {}, workers: {}, timeout: {}s",
        profile.model_id,
        profile.label,
        config.chunking.chunk_size,
        config.extraction.chunk_workers,
        config.extraction.chunk_timeout_secs
    );

    let label = profile.label.clone();
    let client = ChatCompletionsClient::new(profile)?;
    let driver = BatchDriver::new(config, Arc::new(client));

    let stats = driver.run(&label).await?;

    if stats.documents_failed > 0 {
        println!(
            "{}",
            hea_extract::utils::format_warning(&format!(
                "{} document(s) failed, see log for details",
                stats.documents_failed
            ))
        );
    }
    println!(
        "{}",
        hea_extract::utils::format_success(&format!(
            "{} entities from {} document(s), {} chunk(s) skipped",
            stats.entities_written,
            stats.documents_processed,
            stats.chunks_skipped()
        ))
    );

    Ok(())
}
