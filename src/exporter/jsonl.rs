// file: src/exporter/jsonl.rs
// description: truncate-then-append JSONL sink shared across document workers
// reference: one atomic line per record so parallel writers never interleave

use crate::error::Result;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Append-only JSONL output for one model configuration.
///
/// Opened with truncation at batch start (fresh run = fresh file) and only
/// appended to afterwards. The mutex makes each multi-line append atomic
/// with respect to other document workers; it is the single shared resource
/// across documents.
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        info!("Writing output to {}", path.display());
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one JSON object per line and flush. Returns the number of
    /// lines written.
    pub fn append(&self, records: &[Value]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for record in records {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_writes_one_line_per_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/he_data_test.jsonl");

        let sink = JsonlSink::create(&path).unwrap();
        let written = sink
            .append(&[json!({"a": 1}), json!({"b": 2})])
            .unwrap();
        assert_eq!(written, 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"a":1}"#);
        assert_eq!(lines[1], r#"{"b":2}"#);
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("he_data_test.jsonl");

        {
            let sink = JsonlSink::create(&path).unwrap();
            sink.append(&[json!({"stale": true})]).unwrap();
        }
        {
            let sink = JsonlSink::create(&path).unwrap();
            sink.append(&[json!({"fresh": true})]).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"fresh\":true}\n");
    }

    #[test]
    fn test_identical_input_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.jsonl");
        let records = [json!({"k": [1, 2, 3], "m": "v"})];

        let first = {
            let sink = JsonlSink::create(&path).unwrap();
            sink.append(&records).unwrap();
            fs::read(&path).unwrap()
        };
        let second = {
            let sink = JsonlSink::create(&path).unwrap();
            sink.append(&records).unwrap();
            fs::read(&path).unwrap()
        };

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_append_is_noop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.jsonl");
        let sink = JsonlSink::create(&path).unwrap();
        assert_eq!(sink.append(&[]).unwrap(), 0);
    }
}
