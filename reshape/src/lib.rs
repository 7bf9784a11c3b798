//! # uced-reshape - pivot multi-indexed UCED result tables
//!
//! Reads CSV files whose first two columns form a (row key, sub key)
//! index, unstacks the sub key into columns, transposes the result and
//! writes it back over the source file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│   Unstack   │────▶│  Transpose  │──┐
//! │ (key, sub)  │     │ (trimmed)   │     │ (sub → col) │     │ (col → row) │  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘  │
//!        ▲                                                                     │
//!        └──────────────────────────── Writer ◀────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use uced_reshape::{reshape_batch, BatchConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let batch = BatchConfig::default();
//!     reshape_batch(&batch.files, &batch.options)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Indexed tables and labelled frames
//! - [`parser`] - CSV parsing with encoding detection
//! - [`transform`] - Unstack and the reshape pipeline
//! - [`writer`] - CSV serialization and file replacement
//! - [`config`] - Options and batch configuration
//! - [`logs`] - Pipeline log entries

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod writer;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    ParseError,
    ReshapeError,
    ReshapeResult,
    SerializationError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, ColumnLabel, Frame, IndexedRow, IndexedTable, Label};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{BatchConfig, DuplicatePolicy, ReshapeOptions, WriteMode, DEFAULT_FILES};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_encoding,
    parse_indexed_bytes,
    parse_indexed_file,
    parse_indexed_table,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    reshape,
    reshape_batch,
    reshape_bytes,
    reshape_str,
    reshape_table,
    reshape_to_string,
    sorted_labels,
    unstack,
    BatchReport,
    ReshapeSummary,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use writer::{frame_to_csv, write_csv};
