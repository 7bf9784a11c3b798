//! High-level reshape API: parse → unstack → transpose → write.
//!
//! # Example
//!
//! ```rust,ignore
//! use uced_reshape::{reshape, ReshapeOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = reshape("Start_Julia.csv", &ReshapeOptions::default())?;
//!     println!("{} rows written", summary.rows_out);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::unstack::unstack;
use crate::config::ReshapeOptions;
use crate::error::{ReshapeError, ReshapeResult};
use crate::logs::{log_error, log_file, log_info, log_success, log_warning, LogLevel};
use crate::models::{ColumnLabel, Frame, IndexedTable};
use crate::parser::{parse_indexed_bytes, parse_indexed_file, parse_indexed_table};
use crate::writer::{frame_to_csv, write_csv};

/// Shape of one reshape, before and after.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReshapeSummary {
    /// Source file, if the input came from disk.
    pub path: Option<PathBuf>,
    /// Parsed data rows.
    pub rows_in: usize,
    /// Distinct row keys (output columns).
    pub row_keys: usize,
    /// Distinct sub keys.
    pub sub_keys: usize,
    pub value_columns: usize,
    /// Output rows: one per (data column, sub key).
    pub rows_out: usize,
}

/// Outcome of a batch that keeps going after failures.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub reshaped: Vec<ReshapeSummary>,
    /// Failed files and their error messages.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.reshaped.len() + self.failed.len()
    }

    /// `Err(BatchFailed)` if any file failed.
    pub fn into_result(self) -> ReshapeResult<Self> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(ReshapeError::BatchFailed {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Reshape the file at `path` in place.
///
/// The file is only written once parsing and pivoting succeeded, so a
/// failing call leaves it untouched.
pub fn reshape(path: impl AsRef<Path>, options: &ReshapeOptions) -> ReshapeResult<ReshapeSummary> {
    let path = path.as_ref();
    log_info(format!("📄 Reshaping {}", path.display()));

    let table = parse_indexed_file(path, options)?;
    log_file(
        LogLevel::Info,
        path,
        format!("Read {} rows, {} data column(s)", table.len(), table.value_columns.len()),
    );

    let (frame, mut summary) = reshape_table(table, options)?;
    summary.path = Some(path.to_path_buf());

    let csv = frame_to_csv(&frame, options)?;
    write_csv(path, &csv, options.write_mode)?;

    log_file(
        LogLevel::Success,
        path,
        format!("Wrote {} rows × {} columns", summary.rows_out, summary.row_keys),
    );
    Ok(summary)
}

/// Reshape the file at `path` and return the CSV text without writing it.
pub fn reshape_to_string(path: impl AsRef<Path>, options: &ReshapeOptions) -> ReshapeResult<String> {
    let table = parse_indexed_file(path, options)?;
    let (frame, _) = reshape_table(table, options)?;
    Ok(frame_to_csv(&frame, options)?)
}

/// Reshape CSV bytes, detecting their encoding.
pub fn reshape_bytes(bytes: &[u8], options: &ReshapeOptions) -> ReshapeResult<String> {
    let table = parse_indexed_bytes(bytes, options)?;
    let (frame, _) = reshape_table(table, options)?;
    Ok(frame_to_csv(&frame, options)?)
}

/// Reshape CSV text.
///
/// # Example
/// ```ignore
/// let out = reshape_str("key,sub,value\nA,x,1\nA,y,2\nB,x,3", &ReshapeOptions::default())?;
/// assert_eq!(out, ",sub,A,B\nvalue,x,1,3\nvalue,y,2,\n");
/// ```
pub fn reshape_str(content: &str, options: &ReshapeOptions) -> ReshapeResult<String> {
    let table = parse_indexed_table(content, options)?;
    let (frame, _) = reshape_table(table, options)?;
    Ok(frame_to_csv(&frame, options)?)
}

/// Unstack and transpose a parsed table.
pub fn reshape_table(
    table: IndexedTable,
    options: &ReshapeOptions,
) -> ReshapeResult<(Frame<ColumnLabel, String>, ReshapeSummary)> {
    let rows_in = table.len();
    let value_columns = table.value_columns.len();

    let unstacked = unstack(table, options.duplicates)?;
    let sub_keys = if value_columns == 0 {
        0
    } else {
        unstacked.n_cols() / value_columns
    };

    let frame = unstacked.transpose();
    let summary = ReshapeSummary {
        path: None,
        rows_in,
        row_keys: frame.n_cols(),
        sub_keys,
        value_columns,
        rows_out: frame.n_rows(),
    };

    Ok((frame, summary))
}

/// Reshape each file in order.
///
/// Stops at the first failure unless `continue_on_error` is set, in which
/// case failures are collected in the report.
pub fn reshape_batch(files: &[PathBuf], options: &ReshapeOptions) -> ReshapeResult<BatchReport> {
    options.validate()?;
    log_info(format!("🔄 Reshaping {} file(s)", files.len()));

    let mut report = BatchReport::default();

    for path in files {
        match reshape(path, options) {
            Ok(summary) => report.reshaped.push(summary),
            Err(e) if options.continue_on_error => {
                log_file(LogLevel::Error, path, e.to_string());
                report.failed.push((path.clone(), e.to_string()));
            }
            Err(e) => {
                log_file(LogLevel::Error, path, e.to_string());
                log_error(format!("Stopped at {}", path.display()));
                return Err(e);
            }
        }
    }

    if report.failed.is_empty() {
        log_success(format!("All {} file(s) reshaped", report.reshaped.len()));
    } else {
        log_warning(format!(
            "{} of {} file(s) failed",
            report.failed.len(),
            report.total()
        ));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicatePolicy, WriteMode};
    use crate::error::{ParseError, TransformError};
    use crate::logs::PROGRESS;
    use std::fs;
    use tempfile::tempdir;
    use tokio::sync::broadcast::error::TryRecvError;

    const EXAMPLE: &str = "key,sub,value\nA,x,1\nA,y,2\nB,x,3\n";
    const EXAMPLE_OUT: &str = ",sub,A,B\nvalue,x,1,3\nvalue,y,2,\n";

    fn opts() -> ReshapeOptions {
        ReshapeOptions::default()
    }

    #[test]
    fn test_reshape_str_example() {
        assert_eq!(reshape_str(EXAMPLE, &opts()).unwrap(), EXAMPLE_OUT);
    }

    #[test]
    fn test_reshape_file_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Start_Julia.csv");
        fs::write(&path, EXAMPLE).unwrap();

        let summary = reshape(&path, &opts()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), EXAMPLE_OUT);
        assert_eq!(
            summary,
            ReshapeSummary {
                path: Some(path.clone()),
                rows_in: 3,
                row_keys: 2,
                sub_keys: 2,
                value_columns: 1,
                rows_out: 2,
            }
        );
    }

    #[test]
    fn test_value_preservation_and_missing_policy() {
        let input = "unit, hour, on\nG2, 2, 0\nG1, 1, 1\nG1, 2, 1\nG3, 1, 0\n";
        let table = parse_indexed_table(input, &opts()).unwrap();
        let expected = table.clone();
        let (frame, summary) = reshape_table(table, &opts()).unwrap();

        assert_eq!(summary.sub_keys, 2);
        assert_eq!(frame.n_rows(), summary.sub_keys);
        for row in &expected.rows {
            let label = ColumnLabel::new("on", row.sub_key.clone());
            assert_eq!(frame.get(&label, &row.row_key), Some(&row.values[0]));
        }
        assert_eq!(frame.get(&ColumnLabel::new("on", "2"), &"G3".to_string()), Some(&None));
    }

    #[test]
    fn test_na_tokens_written_as_missing() {
        let input = "key,sub,value\nA,x,NA\nA,y, NaN\n";
        assert_eq!(reshape_str(input, &opts()).unwrap(), ",sub,A\nvalue,x,\nvalue,y,\n");
    }

    #[test]
    fn test_spaced_quoted_values_survive() {
        let input = "key,sub,name\nA, x, \"Unit 1, North\"\n";
        assert_eq!(reshape_str(input, &opts()).unwrap(), ",sub,A\nname,x,\"Unit 1, North\"\n");
    }

    #[test]
    fn test_uced_style_hours() {
        let mut input = String::from("unit,hour,start\n");
        for hour in 1..=12 {
            input.push_str(&format!("G1, {}, {}\n", hour, hour % 2));
        }
        let out = reshape_str(&input, &opts()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], ",hour,G1");
        assert_eq!(lines[1], "start,1,1");
        assert_eq!(lines[10], "start,10,0");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn test_second_reshape_changes_structure() {
        let once = reshape_str(EXAMPLE, &opts()).unwrap();
        let twice = reshape_str(&once, &opts()).unwrap();

        assert_ne!(twice, once);
        assert_eq!(twice, ",sub,value\nA,x,1\nA,y,2\nB,x,3\nB,y,\n");
    }

    #[test]
    fn test_missing_file_is_parse_error_and_creates_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Shut_Julia.csv");

        let err = reshape(&path, &opts()).unwrap_err();

        assert!(matches!(err, ReshapeError::Parse(ParseError::Io { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_duplicate_key_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Commit_Julia.csv");
        let input = "key,sub,value\nA,x,1\nA,x,2\n";
        fs::write(&path, input).unwrap();

        let err = reshape(&path, &opts()).unwrap_err();
        assert!(matches!(
            err,
            ReshapeError::Transform(TransformError::DuplicateKey { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), input);

        let last_wins = ReshapeOptions {
            duplicates: DuplicatePolicy::LastWins,
            ..opts()
        };
        reshape(&path, &last_wins).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), ",sub,A\nvalue,x,2\n");
    }

    #[test]
    fn test_reshape_to_string_does_not_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Generation_Julia.csv");
        fs::write(&path, EXAMPLE).unwrap();

        assert_eq!(reshape_to_string(&path, &opts()).unwrap(), EXAMPLE_OUT);
        assert_eq!(fs::read_to_string(&path).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_reshape_bytes_latin1() {
        let mut bytes = b"unit,hour,name\nG1,1,Soci".to_vec();
        bytes.extend_from_slice(&[0xE9, 0x74, 0xE9]);
        bytes.push(b'\n');

        let out = reshape_bytes(&bytes, &opts()).unwrap();
        assert!(out.starts_with(",hour,G1\nname,1,Soci"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_atomic_write_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Start_Julia.csv");
        fs::write(&path, EXAMPLE).unwrap();

        let atomic = ReshapeOptions {
            write_mode: WriteMode::Atomic,
            ..opts()
        };
        reshape(&path, &atomic).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), EXAMPLE_OUT);
    }

    #[test]
    fn test_batch_stops_at_first_failure() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("Start_Julia.csv");
        let missing = dir.path().join("Shut_Julia.csv");
        let last = dir.path().join("Commit_Julia.csv");
        fs::write(&first, EXAMPLE).unwrap();
        fs::write(&last, EXAMPLE).unwrap();

        let files = vec![first.clone(), missing, last.clone()];
        let err = reshape_batch(&files, &opts()).unwrap_err();

        assert!(matches!(err, ReshapeError::Parse(_)));
        assert_eq!(fs::read_to_string(&first).unwrap(), EXAMPLE_OUT);
        assert_eq!(fs::read_to_string(&last).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_batch_continue_on_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("Shut_Julia.csv");
        let last = dir.path().join("Commit_Julia.csv");
        fs::write(&last, EXAMPLE).unwrap();

        let keep_going = ReshapeOptions {
            continue_on_error: true,
            ..opts()
        };
        let report = reshape_batch(&[missing.clone(), last.clone()], &keep_going).unwrap();

        assert_eq!(report.reshaped.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, missing);
        assert_eq!(fs::read_to_string(&last).unwrap(), EXAMPLE_OUT);
        assert!(matches!(
            report.into_result(),
            Err(ReshapeError::BatchFailed { failed: 1, total: 2 })
        ));
    }

    #[test]
    fn test_batch_logs_progress() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logged.csv");
        fs::write(&path, EXAMPLE).unwrap();

        let mut rx = PROGRESS.subscribe();
        reshape_batch(&[path.clone()], &opts()).unwrap();

        let mut entries = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(entry) => entries.push(entry),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        let name = path.display().to_string();
        assert!(entries.iter().any(|e| e.message.contains(&name)));
        assert!(entries
            .iter()
            .any(|e| e.level == LogLevel::Success && e.file.as_deref() == Some(path.as_path())));
    }
}
