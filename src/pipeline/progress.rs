// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for batch execution
// reference: uses indicatif for progress bars and tracks per-chunk outcomes

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub chunks_succeeded: usize,
    pub chunks_timed_out: usize,
    pub chunks_parse_skipped: usize,
    pub chunks_transport_skipped: usize,
    pub records_extracted: usize,
    pub records_excluded: usize,
    pub entities_written: usize,
    pub duration_secs: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks_skipped(&self) -> usize {
        self.chunks_timed_out + self.chunks_parse_skipped + self.chunks_transport_skipped
    }

    pub fn document_success_rate(&self) -> f64 {
        let total = self.documents_processed + self.documents_failed;
        if total == 0 {
            return 0.0;
        }
        (self.documents_processed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    documents_processed: Arc<AtomicUsize>,
    documents_failed: Arc<AtomicUsize>,
    chunks_succeeded: Arc<AtomicUsize>,
    chunks_timed_out: Arc<AtomicUsize>,
    chunks_parse_skipped: Arc<AtomicUsize>,
    chunks_transport_skipped: Arc<AtomicUsize>,
    records_extracted: Arc<AtomicUsize>,
    records_excluded: Arc<AtomicUsize>,
    entities_written: Arc<AtomicUsize>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_documents: usize) -> Self {
        Self::with_color(total_documents, true)
    }

    pub fn with_color(total_documents: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        let main_bar = create_progress_bar(&multi_progress, total_documents as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            documents_processed: Arc::new(AtomicUsize::new(0)),
            documents_failed: Arc::new(AtomicUsize::new(0)),
            chunks_succeeded: Arc::new(AtomicUsize::new(0)),
            chunks_timed_out: Arc::new(AtomicUsize::new(0)),
            chunks_parse_skipped: Arc::new(AtomicUsize::new(0)),
            chunks_transport_skipped: Arc::new(AtomicUsize::new(0)),
            records_extracted: Arc::new(AtomicUsize::new(0)),
            records_excluded: Arc::new(AtomicUsize::new(0)),
            entities_written: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_document_processed(&self) {
        self.documents_processed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_document_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn add_chunk_counts(
        &self,
        succeeded: usize,
        timed_out: usize,
        parse_skipped: usize,
        transport_skipped: usize,
    ) {
        self.chunks_succeeded.fetch_add(succeeded, Ordering::SeqCst);
        self.chunks_timed_out.fetch_add(timed_out, Ordering::SeqCst);
        self.chunks_parse_skipped
            .fetch_add(parse_skipped, Ordering::SeqCst);
        self.chunks_transport_skipped
            .fetch_add(transport_skipped, Ordering::SeqCst);
    }

    pub fn add_records(&self, extracted: usize, excluded: usize) {
        self.records_extracted.fetch_add(extracted, Ordering::SeqCst);
        self.records_excluded.fetch_add(excluded, Ordering::SeqCst);
    }

    pub fn add_entities(&self, count: usize) {
        self.entities_written.fetch_add(count, Ordering::SeqCst);
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Batch complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> RunStats {
        RunStats {
            documents_processed: self.documents_processed.load(Ordering::SeqCst),
            documents_failed: self.documents_failed.load(Ordering::SeqCst),
            chunks_succeeded: self.chunks_succeeded.load(Ordering::SeqCst),
            chunks_timed_out: self.chunks_timed_out.load(Ordering::SeqCst),
            chunks_parse_skipped: self.chunks_parse_skipped.load(Ordering::SeqCst),
            chunks_transport_skipped: self.chunks_transport_skipped.load(Ordering::SeqCst),
            records_extracted: self.records_extracted.load(Ordering::SeqCst),
            records_excluded: self.records_excluded.load(Ordering::SeqCst),
            entities_written: self.entities_written.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let entities = self.entities_written.load(Ordering::SeqCst);
        let skipped = self.chunks_timed_out.load(Ordering::SeqCst)
            + self.chunks_parse_skipped.load(Ordering::SeqCst)
            + self.chunks_transport_skipped.load(Ordering::SeqCst);
        let failed = self.documents_failed.load(Ordering::SeqCst);

        self.detail_bar.set_message(format!(
            "Entities: {} | Skipped chunks: {} | Failed docs: {}",
            entities, skipped, failed
        ));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}
