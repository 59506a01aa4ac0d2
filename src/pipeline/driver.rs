// file: src/pipeline/driver.rs
// description: iterates the document set and isolates per-document failures
// reference: chunk -> extract -> aggregate -> write, one document at a time

use crate::aggregator::{self, AggregationResult};
use crate::chunker;
use crate::config::Config;
use crate::error::{PipelineError, Result, SkipReason};
use crate::exporter::{JsonlSink, entity_to_target_json};
use crate::extractor::client::ExtractionBackend;
use crate::extractor::controller::{ChunkOutcome, RetryController};
use crate::models::ExtractionRecord;
use crate::pdf;
use crate::pipeline::progress::{ProgressTracker, RunStats};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Per-document accounting surfaced in the logs.
#[derive(Debug, Clone, Default)]
pub struct DocumentSummary {
    pub doc: String,
    pub chunks_total: usize,
    pub chunks_succeeded: usize,
    pub chunks_timed_out: usize,
    pub chunks_parse_skipped: usize,
    pub chunks_transport_skipped: usize,
    pub records: usize,
    pub records_excluded: usize,
    pub entities: usize,
}

impl DocumentSummary {
    fn log(&self) {
        info!(
            "{}: {} chunk(s) ({} ok, {} timeout, {} parse, {} transport), {} record(s), {} entit(ies)",
            self.doc,
            self.chunks_total,
            self.chunks_succeeded,
            self.chunks_timed_out,
            self.chunks_parse_skipped,
            self.chunks_transport_skipped,
            self.records,
            self.entities
        );
    }
}

/// Runs the whole batch: list PDFs, then per document
/// chunk → retry controller → aggregate → sink. One bad document is
/// logged and skipped; only configuration and startup failures abort.
pub struct BatchDriver<B> {
    config: Config,
    controller: RetryController<B>,
}

impl<B: ExtractionBackend> BatchDriver<B> {
    pub fn new(config: Config, backend: Arc<B>) -> Self {
        let controller = RetryController::new(
            backend,
            Duration::from_secs(config.extraction.chunk_timeout_secs),
            config.chunking.min_split_chars,
        );
        Self { config, controller }
    }

    /// Process every PDF under the input directory, writing aggregated
    /// entities to `he_data_{model_label}.jsonl`.
    pub async fn run(&self, model_label: &str) -> Result<RunStats> {
        let mut pdfs = pdf::list_pdfs(&self.config.input.pdf_dir);
        if pdfs.is_empty() {
            return Err(PipelineError::Config(format!(
                "no PDF files found in {}",
                self.config.input.pdf_dir.display()
            )));
        }

        if self.config.input.max_docs > 0 && pdfs.len() > self.config.input.max_docs {
            pdfs.truncate(self.config.input.max_docs);
            info!("Limiting run to first {} PDF(s)", pdfs.len());
        }

        let output_path = self
            .config
            .output
            .dir
            .join(format!("he_data_{}.jsonl", model_label));
        let sink = JsonlSink::create(output_path)?;

        let tracker = ProgressTracker::new(pdfs.len());
        info!("Processing {} PDF(s)", pdfs.len());

        for (i, path) in pdfs.iter().enumerate() {
            let doc = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            tracker.set_message(format!("[{}/{}] {}", i + 1, pdfs.len(), doc));

            match self.process_document(path, &doc, &sink).await {
                Ok(summary) => {
                    summary.log();
                    tracker.add_chunk_counts(
                        summary.chunks_succeeded,
                        summary.chunks_timed_out,
                        summary.chunks_parse_skipped,
                        summary.chunks_transport_skipped,
                    );
                    tracker.add_records(summary.records, summary.records_excluded);
                    tracker.add_entities(summary.entities);
                    tracker.inc_document_processed();
                }
                Err(e) => {
                    error!("Failed to process {}: {}", doc, e);
                    tracker.inc_document_failed();
                }
            }
        }

        let stats = tracker.get_stats();
        tracker.finish();
        self.log_final_stats(&stats, sink.path());
        Ok(stats)
    }

    async fn process_document(
        &self,
        path: &Path,
        doc: &str,
        sink: &JsonlSink,
    ) -> Result<DocumentSummary> {
        info!("Extracting text from {}", doc);
        let path_buf = path.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || pdf::extract_text(&path_buf))
            .await
            .map_err(|e| PipelineError::PdfExtract {
                path: path.to_path_buf(),
                message: format!("extraction task failed: {}", e),
            })??;

        let text = pdf::truncate_back_matter(&pdf::clean_paper_text(&raw));
        info!("{}: {} chars raw, {} after cleaning", doc, raw.len(), text.len());

        self.process_text(doc, &text, sink).await
    }

    /// Chunk cleaned text, drive each chunk through the retry controller,
    /// aggregate the pooled records and append the entities to the sink.
    /// Split out from PDF reading so the orchestration is testable with a
    /// simulated backend.
    pub async fn process_text(
        &self,
        doc: &str,
        text: &str,
        sink: &JsonlSink,
    ) -> Result<DocumentSummary> {
        let chunks = chunker::chunk_text(
            doc,
            text,
            self.config.chunking.chunk_size,
            self.config.chunking.overlap,
        )?;
        let mut summary = DocumentSummary {
            doc: doc.to_string(),
            chunks_total: chunks.len(),
            ..Default::default()
        };

        if chunks.is_empty() {
            warn!("{}: no text to chunk, skipping", doc);
            return Ok(summary);
        }

        info!(
            "{}: {} chunk(s), chunk_size={}, workers={}",
            doc,
            chunks.len(),
            self.config.chunking.chunk_size,
            self.config.extraction.chunk_workers
        );

        let outcomes = self
            .controller
            .run_document(chunks, self.config.extraction.chunk_workers)
            .await;

        let mut pooled: Vec<ExtractionRecord> = Vec::new();
        for outcome in outcomes {
            tally_outcome(&mut summary, &outcome);
            pooled.extend(outcome.records);
        }
        summary.records = pooled.len();

        if pooled.is_empty() {
            info!("{}: no records extracted", doc);
            return Ok(summary);
        }

        let AggregationResult {
            entities,
            records_excluded,
        } = aggregator::group_records(pooled);
        summary.records_excluded = records_excluded;
        summary.entities = entities.len();

        let lines: Vec<Value> = entities
            .iter()
            .map(|entity| entity_to_target_json(entity, doc))
            .collect();
        sink.append(&lines)?;

        Ok(summary)
    }

    fn log_final_stats(&self, stats: &RunStats, output: &Path) {
        info!("=== Extraction Run Summary ===");
        info!("Duration: {} seconds", stats.duration_secs);
        info!("Documents processed: {}", stats.documents_processed);
        info!("Documents failed: {}", stats.documents_failed);
        info!("Document success rate: {:.2}%", stats.document_success_rate());
        info!("Chunks succeeded: {}", stats.chunks_succeeded);
        info!(
            "Chunks skipped: {} ({} timeout, {} parse_failure, {} transport_error)",
            stats.chunks_skipped(),
            stats.chunks_timed_out,
            stats.chunks_parse_skipped,
            stats.chunks_transport_skipped
        );
        info!("Records extracted: {}", stats.records_extracted);
        info!("Records excluded by validation: {}", stats.records_excluded);
        info!("Entities written: {}", stats.entities_written);
        info!("Output: {}", output.display());
        info!("==============================");
    }
}

fn tally_outcome(summary: &mut DocumentSummary, outcome: &ChunkOutcome) {
    if outcome.succeeded() {
        summary.chunks_succeeded += 1;
    }
    for skip in &outcome.skips {
        match skip.reason {
            SkipReason::Timeout => summary.chunks_timed_out += 1,
            SkipReason::ParseFailure => summary.chunks_parse_skipped += 1,
            SkipReason::TransportError => summary.chunks_transport_skipped += 1,
        }
    }
}
