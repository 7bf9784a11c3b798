//! Error types for the reshape pipeline.
//!
//! - [`ParseError`] - reading and parsing the indexed CSV
//! - [`TransformError`] - pivoting the parsed table
//! - [`SerializationError`] - writing the reshaped table back
//! - [`ConfigError`] - loading and validating options
//! - [`ReshapeError`] - top-level orchestration errors
//!
//! Lower-level errors convert into [`ReshapeError`] via `From`,
//! so `?` works across module boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors while reading an indexed CSV file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be opened or read.
    #[error("Cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content could not be decoded as text.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A record is not usable as an indexed row.
    #[error("Line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// No header and no records.
    #[error("CSV file is empty")]
    EmptyFile,

    /// The options cannot be used for reading.
    #[error("Invalid options: {0}")]
    Options(#[from] ConfigError),

    /// Fewer than the two columns needed for the composite key.
    #[error("Expected at least 2 index columns, found {found}")]
    MissingIndexColumns { found: usize },
}

impl ParseError {
    pub fn malformed(line: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors while pivoting a parsed table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The same (row key, sub key) pair appears twice.
    #[error("Index contains duplicate entry ('{row_key}', '{sub_key}'), cannot reshape")]
    DuplicateKey { row_key: String, sub_key: String },
}

// =============================================================================
// Serialization Errors
// =============================================================================

/// Errors while writing the reshaped table.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// CSV encoding failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the target file failed.
    #[error("Cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The options cannot be used for writing.
    #[error("Invalid options: {0}")]
    Options(#[from] ConfigError),

    /// Renaming the temporary file over the target failed.
    #[error("Cannot replace '{}': {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Cannot read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for a batch.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The CSV reader and writer only accept single-byte delimiters.
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

// =============================================================================
// Reshape Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::transform::pipeline::reshape`]
/// and the batch runner.
#[derive(Debug, Error)]
pub enum ReshapeError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Only produced when the batch keeps going after failures.
    #[error("{failed} of {total} files failed to reshape")]
    BatchFailed { failed: usize, total: usize },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type ParseResult<T> = Result<T, ParseError>;

pub type TransformResult<T> = Result<T, TransformError>;

pub type SerializationResult<T> = Result<T, SerializationError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

pub type ReshapeResult<T> = Result<T, ReshapeError>;
