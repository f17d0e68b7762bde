//! Append-only markdown research report

use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Timestamp format used in report records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator closing every record
pub const RECORD_SEPARATOR: &str = "---";

/// Writes question/answer records to a report file
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    /// Create a writer for the report at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Report file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record stamped with the current local time
    pub fn append_record(&self, question: &str, answer: &str) -> crate::Result<()> {
        self.append_record_at(question, answer, Local::now())
    }

    /// Append one record with an explicit timestamp
    pub fn append_record_at(
        &self,
        question: &str,
        answer: &str,
        timestamp: DateTime<Local>,
    ) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let record = format_record(question, answer, timestamp);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;

        debug!(path = %self.path.display(), bytes = record.len(), "Report record appended");
        Ok(())
    }
}

/// Append one record to the report at `path`
pub fn append_record<P: AsRef<Path>>(question: &str, answer: &str, path: P) -> crate::Result<()> {
    ReportWriter::new(path).append_record(question, answer)
}

/// Render a single report record. Text is written verbatim.
pub fn format_record(question: &str, answer: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "### Timestamp: {}\n\n## Question\n{}\n\n## Answer\n{}\n\n{}\n\n",
        timestamp.format(TIMESTAMP_FORMAT),
        question,
        answer,
        RECORD_SEPARATOR
    )
}
