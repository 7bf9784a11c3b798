//! Reshape options and batch configuration.
//!
//! The default batch is the four UCED output files. A batch can also be
//! loaded from a JSON file:
//!
//! ```json
//! {
//!   "files": ["Start_Julia.csv", "Shut_Julia.csv"],
//!   "options": { "delimiter": ",", "duplicates": "last-wins" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Files reshaped when no arguments are given, relative to the working directory.
pub const DEFAULT_FILES: [&str; 4] = [
    "Start_Julia.csv",
    "Shut_Julia.csv",
    "Commit_Julia.csv",
    "Generation_Julia.csv",
];

/// What to do when a (row key, sub key) pair occurs more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail with [`crate::error::TransformError::DuplicateKey`].
    #[default]
    Reject,
    /// The later row replaces the earlier one.
    LastWins,
}

/// How the reshaped table replaces the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Truncate and rewrite the file.
    #[default]
    Overwrite,
    /// Write a temporary file next to the source and rename it over.
    Atomic,
}

/// Options for a single reshape and for batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReshapeOptions {
    /// Field delimiter for reading and writing.
    pub delimiter: char,

    /// Text written for missing cells.
    pub missing_marker: String,

    /// Whether the first record is a header row.
    pub has_headers: bool,

    pub duplicates: DuplicatePolicy,

    pub write_mode: WriteMode,

    /// Keep reshaping the rest of a batch after a failure.
    pub continue_on_error: bool,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            missing_marker: String::new(),
            has_headers: true,
            duplicates: DuplicatePolicy::Reject,
            write_mode: WriteMode::Overwrite,
            continue_on_error: false,
        }
    }
}

impl ReshapeOptions {
    /// The delimiter as the single byte the CSV reader and writer expect.
    pub fn delimiter_byte(&self) -> ConfigResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::InvalidDelimiter(self.delimiter))
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.delimiter_byte().map(|_| ())
    }
}

/// A list of files and the options to reshape them with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub files: Vec<PathBuf>,
    pub options: ReshapeOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            files: DEFAULT_FILES.iter().map(PathBuf::from).collect(),
            options: ReshapeOptions::default(),
        }
    }
}

impl BatchConfig {
    /// Load a batch from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.options.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
