//! CSV serialization of a [`Frame`] and replacement of the target file.
//!
//! The header line holds the index level names followed by the column
//! labels. Each data line holds the parts of its row label followed by its
//! cells, with missing cells written as the configured marker.

use std::fs;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tempfile::NamedTempFile;

use crate::config::{ReshapeOptions, WriteMode};
use crate::error::{SerializationError, SerializationResult};
use crate::models::{Frame, Label};

/// Render a frame as CSV text.
pub fn frame_to_csv<R: Label>(frame: &Frame<R, String>, options: &ReshapeOptions) -> SerializationResult<String> {
    let delimiter = options.delimiter_byte()?;

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());

    let header = frame
        .index_names
        .iter()
        .map(String::as_str)
        .chain(frame.columns.iter().map(String::as_str));
    writer.write_record(header)?;

    for (label, cells) in frame.rows() {
        let values = cells
            .iter()
            .map(|c| c.as_deref().unwrap_or(options.missing_marker.as_str()));
        writer.write_record(label.parts().into_iter().chain(values))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SerializationError::Csv(csv::Error::from(e.into_error())))?;

    // Every field written above came from a &str.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Replace the content of `path` with `content`.
pub fn write_csv(path: &Path, content: &str, mode: WriteMode) -> SerializationResult<()> {
    match mode {
        WriteMode::Overwrite => fs::write(path, content).map_err(|source| SerializationError::Write {
            path: path.to_path_buf(),
            source,
        }),
        WriteMode::Atomic => write_atomic(path, content),
    }
}

fn write_atomic(path: &Path, content: &str) -> SerializationResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source| SerializationError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;

    tmp.persist(path).map_err(|e| SerializationError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, ColumnLabel};
    use tempfile::tempdir;

    fn cell(v: &str) -> Cell {
        Some(v.to_string())
    }

    fn reshaped() -> Frame<ColumnLabel, String> {
        Frame::from_cells(
            vec!["".into(), "sub".into()],
            vec!["key".into()],
            vec![ColumnLabel::new("value", "x"), ColumnLabel::new("value", "y")],
            vec!["A".into(), "B".into()],
            vec![vec![cell("1"), cell("3")], vec![cell("2"), None]],
        )
    }

    #[test]
    fn test_frame_to_csv() {
        let csv = frame_to_csv(&reshaped(), &ReshapeOptions::default()).unwrap();
        assert_eq!(csv, ",sub,A,B\nvalue,x,1,3\nvalue,y,2,\n");
    }

    #[test]
    fn test_missing_marker() {
        let opts = ReshapeOptions {
            missing_marker: "NA".into(),
            ..ReshapeOptions::default()
        };
        let csv = frame_to_csv(&reshaped(), &opts).unwrap();
        assert!(csv.ends_with("value,y,2,NA\n"));
    }

    #[test]
    fn test_fields_with_delimiter_are_quoted() {
        let frame: Frame<String, String> = Frame::from_cells(
            vec!["name".into()],
            vec!["unit".into()],
            vec!["cost".into()],
            vec!["G1".into()],
            vec![vec![cell("1,5")]],
        );
        let csv = frame_to_csv(&frame, &ReshapeOptions::default()).unwrap();
        assert_eq!(csv, "name,G1\ncost,\"1,5\"\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let opts = ReshapeOptions {
            delimiter: ';',
            ..ReshapeOptions::default()
        };
        let csv = frame_to_csv(&reshaped(), &opts).unwrap();
        assert!(csv.starts_with(";sub;A;B\n"));
    }

    #[test]
    fn test_overwrite_and_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Start_Julia.csv");
        fs::write(&path, "old").unwrap();

        write_csv(&path, "new,1\n", WriteMode::Overwrite).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new,1\n");

        write_csv(&path, "newer,2\n", WriteMode::Atomic).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "newer,2\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = write_csv(&path, "x", WriteMode::Overwrite).unwrap_err();
        assert!(matches!(err, SerializationError::Write { .. }));
        assert!(write_csv(&path, "x", WriteMode::Atomic).is_err());
    }
}
