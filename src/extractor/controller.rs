// file: src/extractor/controller.rs
// description: per-chunk timeout enforcement and split-retry worklist
// reference: bounds every extraction attempt so one bad chunk never stalls a batch

use crate::chunker::Chunk;
use crate::error::{PipelineError, SkipReason};
use crate::extractor::client::ExtractionBackend;
use crate::models::ExtractionRecord;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Accounting entry for a chunk (or sub-chunk) that was abandoned.
#[derive(Debug, Clone)]
pub struct ChunkSkip {
    pub chunk: String,
    pub reason: SkipReason,
    pub detail: String,
}

/// Terminal result of driving one original chunk, split-retries included.
#[derive(Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    pub records: Vec<ExtractionRecord>,
    pub skips: Vec<ChunkSkip>,
}

impl ChunkOutcome {
    pub fn succeeded(&self) -> bool {
        self.skips.is_empty()
    }
}

/// Drives the extraction backend per chunk.
///
/// Policy: each attempt is bounded by a wall-clock timeout; a timed-out
/// attempt is aborted and never retried (a slow backend retried again would
/// likely time out again). A parse failure halves the chunk and retries each
/// half independently, down to a floor. Transport failures and rate limits
/// are skipped for a later run. Nothing escapes past the controller.
///
/// All state is chunk-local, so chunks can be dispatched to parallel workers
/// without synchronization beyond collecting the outcomes.
pub struct RetryController<B> {
    backend: Arc<B>,
    chunk_timeout: Duration,
    min_split_chars: usize,
}

impl<B: ExtractionBackend> RetryController<B> {
    pub fn new(backend: Arc<B>, chunk_timeout: Duration, min_split_chars: usize) -> Self {
        Self {
            backend,
            chunk_timeout,
            min_split_chars,
        }
    }

    /// Run every chunk of one document, `workers` at a time. The buffered
    /// stream yields outcomes in chunk order, so aggregation stays stable
    /// regardless of parallelism.
    pub async fn run_document(&self, chunks: Vec<Chunk>, workers: usize) -> Vec<ChunkOutcome> {
        stream::iter(chunks.into_iter().map(|chunk| self.run_chunk(chunk)))
            .buffered(workers.max(1))
            .collect()
            .await
    }

    /// Drive one original chunk to its terminal state.
    ///
    /// Split-retry is an explicit worklist of pending descriptors rather
    /// than recursion: depth is bounded by the floor check and every
    /// descriptor feeds the accounting exactly once. Halves are processed
    /// front-first so records keep source order.
    pub async fn run_chunk(&self, chunk: Chunk) -> ChunkOutcome {
        let index = chunk.index;
        let mut pending = VecDeque::from([chunk]);
        let mut records = Vec::new();
        let mut skips = Vec::new();

        while let Some(current) = pending.pop_front() {
            match self.attempt(&current).await {
                Ok(mut extracted) => {
                    if !extracted.is_empty() {
                        info!(
                            "Chunk {} ({}): {} extraction(s)",
                            current.label,
                            current.doc,
                            extracted.len()
                        );
                    }
                    for record in &mut extracted {
                        record.set_chunk(&current.label);
                    }
                    records.extend(extracted);
                }
                Err(err) => match err.skip_reason() {
                    Some(SkipReason::ParseFailure) => {
                        if current.text.chars().count() > self.min_split_chars {
                            if let Some((first, second)) = current.split() {
                                warn!(
                                    "Chunk {} ({}) failed to parse, splitting into {} + {}",
                                    current.label, current.doc, first.label, second.label
                                );
                                pending.push_front(second);
                                pending.push_front(first);
                                continue;
                            }
                        }
                        warn!(
                            "Chunk {} ({}) at split floor, abandoning: {}",
                            current.label, current.doc, err
                        );
                        skips.push(ChunkSkip {
                            chunk: current.label.clone(),
                            reason: SkipReason::ParseFailure,
                            detail: err.to_string(),
                        });
                    }
                    Some(reason) => {
                        warn!(
                            "Chunk {} ({}) skipped ({}): {}",
                            current.label, current.doc, reason, err
                        );
                        skips.push(ChunkSkip {
                            chunk: current.label.clone(),
                            reason,
                            detail: err.to_string(),
                        });
                    }
                    // Anything unclassified gets the transport bucket so the
                    // skip is still visible downstream.
                    None => {
                        warn!(
                            "Chunk {} ({}) unexpected failure, skipping: {}",
                            current.label, current.doc, err
                        );
                        skips.push(ChunkSkip {
                            chunk: current.label.clone(),
                            reason: SkipReason::TransportError,
                            detail: err.to_string(),
                        });
                    }
                },
            }
        }

        ChunkOutcome {
            index,
            records,
            skips,
        }
    }

    /// One bounded attempt. The backend call runs in its own task so a
    /// non-yielding adapter can be forcibly abandoned: on timeout the task
    /// is aborted, not awaited.
    async fn attempt(&self, chunk: &Chunk) -> crate::error::Result<Vec<ExtractionRecord>> {
        let backend = Arc::clone(&self.backend);
        let text = chunk.text.clone();
        let mut task = tokio::spawn(async move { backend.extract(&text).await });

        match tokio::time::timeout(self.chunk_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(PipelineError::Transport(format!(
                "extraction task failed: {}",
                join_err
            ))),
            Err(_) => {
                task.abort();
                Err(PipelineError::Timeout(self.chunk_timeout.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk_text;
    use crate::error::Result;
    use crate::models::{ExtractionRecord, ProcessRecord};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn process_record(material_id: &str) -> ExtractionRecord {
        ExtractionRecord::Process(ProcessRecord {
            material_id: material_id.to_string(),
            method: "Arc Melting".to_string(),
            heat_treatment: None,
            details: None,
            evidence: "arc melting".to_string(),
            chunk: String::new(),
        })
    }

    fn one_chunk(len: usize) -> Chunk {
        chunk_text("doc.pdf", &"x".repeat(len), len.max(2), 0)
            .unwrap()
            .remove(0)
    }

    struct SucceedingBackend;

    impl ExtractionBackend for SucceedingBackend {
        async fn extract(&self, _text: &str) -> Result<Vec<ExtractionRecord>> {
            Ok(vec![process_record("HEA-1")])
        }
    }

    struct ParseFailBackend {
        attempts: AtomicUsize,
    }

    impl ExtractionBackend for ParseFailBackend {
        async fn extract(&self, _text: &str) -> Result<Vec<ExtractionRecord>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(PipelineError::Parse("not json".to_string()))
        }
    }

    struct HangingBackend;

    impl ExtractionBackend for HangingBackend {
        async fn extract(&self, _text: &str) -> Result<Vec<ExtractionRecord>> {
            tokio::time::sleep(Duration::from_secs(100_000)).await;
            Ok(Vec::new())
        }
    }

    struct TransportFailBackend;

    impl ExtractionBackend for TransportFailBackend {
        async fn extract(&self, _text: &str) -> Result<Vec<ExtractionRecord>> {
            Err(PipelineError::Transport("connection reset".to_string()))
        }
    }

    /// Parses the first half, rejects everything longer.
    struct HalfParsingBackend {
        parse_below: usize,
    }

    impl ExtractionBackend for HalfParsingBackend {
        async fn extract(&self, text: &str) -> Result<Vec<ExtractionRecord>> {
            if text.len() <= self.parse_below {
                Ok(vec![process_record("HEA-2")])
            } else {
                Err(PipelineError::Parse("too long".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_successful_chunk_records_are_labeled() {
        let controller = RetryController::new(
            Arc::new(SucceedingBackend),
            Duration::from_secs(5),
            2000,
        );
        let outcome = controller.run_chunk(one_chunk(100)).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].chunk(), "0");
    }

    #[tokio::test]
    async fn test_parse_failure_splits_to_floor_then_abandons() {
        let backend = Arc::new(ParseFailBackend {
            attempts: AtomicUsize::new(0),
        });
        let controller =
            RetryController::new(Arc::clone(&backend), Duration::from_secs(5), 2000);

        // 8000 chars, floor 2000: level 0 (8000) splits, level 1 (2x4000)
        // splits, level 2 (4x2000) is at the floor
        let outcome = controller.run_chunk(one_chunk(8000)).await;

        assert_eq!(backend.attempts.load(Ordering::SeqCst), 7);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skips.len(), 4);
        assert!(
            outcome
                .skips
                .iter()
                .all(|s| s.reason == SkipReason::ParseFailure)
        );
        let labels: Vec<&str> = outcome.skips.iter().map(|s| s.chunk.as_str()).collect();
        assert_eq!(labels, vec!["0aa", "0ab", "0ba", "0bb"]);
    }

    #[tokio::test]
    async fn test_split_retry_recovers_half_sized_chunks() {
        let controller = RetryController::new(
            Arc::new(HalfParsingBackend { parse_below: 3000 }),
            Duration::from_secs(5),
            1000,
        );
        let outcome = controller.run_chunk(one_chunk(4000)).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].chunk(), "0a");
        assert_eq!(outcome.records[1].chunk(), "0b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_backend_is_abandoned_at_timeout() {
        let timeout = Duration::from_secs(240);
        let controller = RetryController::new(Arc::new(HangingBackend), timeout, 2000);

        let started = tokio::time::Instant::now();
        let outcome = controller.run_chunk(one_chunk(6000)).await;
        let elapsed = started.elapsed();

        assert_eq!(outcome.skips.len(), 1);
        assert_eq!(outcome.skips[0].reason, SkipReason::Timeout);
        // control returns at the deadline, not when the sleep would end
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_transport_failure_skips_without_retry() {
        let controller = RetryController::new(
            Arc::new(TransportFailBackend),
            Duration::from_secs(5),
            2000,
        );
        let outcome = controller.run_chunk(one_chunk(6000)).await;

        assert_eq!(outcome.skips.len(), 1);
        assert_eq!(outcome.skips[0].reason, SkipReason::TransportError);
        assert_eq!(outcome.skips[0].chunk, "0");
    }

    #[tokio::test]
    async fn test_run_document_preserves_chunk_order() {
        let controller = RetryController::new(
            Arc::new(SucceedingBackend),
            Duration::from_secs(5),
            2000,
        );
        let chunks = chunk_text("doc.pdf", &"y".repeat(10_000), 3000, 200).unwrap();
        let expected: Vec<usize> = chunks.iter().map(|c| c.index).collect();

        // workers > 1 exercises the buffered path
        let outcomes = controller.run_document(chunks, 3).await;
        let got: Vec<usize> = outcomes.iter().map(|o| o.index).collect();
        assert_eq!(got, expected);
    }
}
