// file: src/pdf/reader.rs
// description: directory listing and plain-text extraction for pdf inputs
// reference: https://docs.rs/pdf-extract

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// List .pdf files directly under `dir`, sorted by file name so runs are
/// deterministic. A missing directory yields an empty list, not an error.
pub fn list_pdfs(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut pdfs: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();

    pdfs.sort();
    info!("Found {} PDF files in {}", pdfs.len(), dir.display());
    pdfs
}

/// Extract the full plain text of one PDF. This is a blocking call; the
/// batch driver runs it on the blocking thread pool.
pub fn extract_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(PipelineError::PdfExtract {
            path: path.to_path_buf(),
            message: "file does not exist".to_string(),
        });
    }

    let text = pdf_extract::extract_text(path).map_err(|e| PipelineError::PdfExtract {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    debug!("Extracted {} chars from {}", text.len(), path.display());
    Ok(text)
}
