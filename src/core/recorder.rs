use crate::domain::model::TimingRecord;
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const TIMING_HEADER: [&str; 4] = ["Endpoint", "Start Time", "End Time", "Wait Time (seconds)"];

/// Append-only CSV log of remote call timings, shared by every driver.
///
/// Rows are written and flushed synchronously under a `std::sync::Mutex`, on
/// the calling task's thread. One short row per remote call keeps the blocking
/// window far below the request latency being measured.
pub struct TimingRecorder {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl TimingRecorder {
    /// Opens `path` for appending, writing the header row if the file is new or empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(TIMING_HEADER)?;
            writer.flush()?;
            tracing::debug!("Created timing log {}", path.display());
        }

        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, label: &str, start: DateTime<Local>, end: DateTime<Local>) -> Result<()> {
        self.append(&TimingRecord::new(label, start, end))
    }

    /// Writes and flushes one row while holding the lock, so rows from
    /// concurrent drivers never interleave.
    pub fn append(&self, record: &TimingRecord) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_record(record.to_row())?;
        writer.flush()?;
        Ok(())
    }

    /// Reads back every row after the header.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<csv::StringRecord>> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_header_written_once_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");

        let recorder = TimingRecorder::open(&path).unwrap();
        let now = Local::now();
        recorder.record("create-a", now, now).unwrap();
        drop(recorder);

        let recorder = TimingRecorder::open(&path).unwrap();
        recorder.record("process-a", now, now).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Endpoint,Start Time,End Time,Wait Time (seconds)");
        assert!(lines[1].starts_with("create-a,"));
        assert!(lines[2].starts_with("process-a,"));
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("report.csv");
        let recorder = TimingRecorder::open(&path).unwrap();
        assert_eq!(recorder.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn test_concurrent_writers_produce_whole_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        let recorder = Arc::new(TimingRecorder::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|w| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let now = Local::now();
                        recorder.record(&format!("get-{}-{}", w, i), now, now).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let rows = TimingRecorder::read_all(&path).unwrap();
        assert_eq!(rows.len(), 400);
        assert!(rows.iter().all(|row| row.len() == 4 && row[0].starts_with("get-")));

        // per-writer order is preserved
        let writer_three: Vec<String> = rows
            .iter()
            .filter(|row| row[0].starts_with("get-3-"))
            .map(|row| row[0].to_string())
            .collect();
        let expected: Vec<String> = (0..50).map(|i| format!("get-3-{}", i)).collect();
        assert_eq!(writer_three, expected);
    }
}
