//! uced-reshape CLI - pivot and transpose UCED result tables in place
//!
//! ```bash
//! uced-reshape                          # Reshape the four default UCED files
//! uced-reshape run a.csv b.csv          # Reshape the given files
//! uced-reshape run --config batch.json  # Reshape a configured batch
//! uced-reshape preview Start_Julia.csv  # Print the result, leave the file alone
//! uced-reshape example-config           # Show the default batch configuration
//! ```

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use uced_reshape::{
    reshape_batch, reshape_to_string, BatchConfig, DuplicatePolicy, ReshapeOptions, WriteMode,
};

#[derive(Parser)]
#[command(name = "uced-reshape")]
#[command(about = "Unstack and transpose two-level indexed CSV files in place", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reshape files in place (default: the four UCED output files)
    Run {
        /// Files to reshape, replacing the configured list
        files: Vec<PathBuf>,

        /// Batch configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep going after a file fails
        #[arg(long)]
        keep_going: bool,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Print the reshaped table without modifying the input
    Preview {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Show the default batch configuration
    ExampleConfig,
}

#[derive(Args, Default)]
struct FormatArgs {
    /// CSV delimiter (default: ',')
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Text written for missing values (default: empty)
    #[arg(long)]
    missing: Option<String>,

    /// The first line is data, not a header
    #[arg(long)]
    no_header: bool,

    /// Let later duplicate rows replace earlier ones instead of failing
    #[arg(long)]
    last_wins: bool,

    /// Write to a temporary file and rename it over the input
    #[arg(long)]
    atomic: bool,
}

impl FormatArgs {
    /// Override `options` with the flags that were given.
    fn apply(self, options: &mut ReshapeOptions) {
        if let Some(d) = self.delimiter {
            options.delimiter = d;
        }
        if let Some(m) = self.missing {
            options.missing_marker = m;
        }
        if self.no_header {
            options.has_headers = false;
        }
        if self.last_wins {
            options.duplicates = DuplicatePolicy::LastWins;
        }
        if self.atomic {
            options.write_mode = WriteMode::Atomic;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => cmd_run(Vec::new(), None, false, FormatArgs::default()),

        Some(Commands::Run {
            files,
            config,
            keep_going,
            format,
        }) => cmd_run(files, config.as_deref(), keep_going, format),

        Some(Commands::Preview {
            input,
            output,
            format,
        }) => cmd_preview(&input, output.as_deref(), format),

        Some(Commands::ExampleConfig) => cmd_example_config(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    files: Vec<PathBuf>,
    config: Option<&Path>,
    keep_going: bool,
    format: FormatArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = match config {
        Some(path) => {
            eprintln!("⚙️  Config: {}", path.display());
            BatchConfig::load(path)?
        }
        None => BatchConfig::default(),
    };
    let batch = merge_batch(base, files, keep_going, format);

    let report = reshape_batch(&batch.files, &batch.options)?;
    report.into_result()?;

    eprintln!("\n✨ Done!");
    Ok(())
}

/// Layer command-line arguments over a loaded batch. Given files replace
/// the configured list; flags override the configured options.
fn merge_batch(mut batch: BatchConfig, files: Vec<PathBuf>, keep_going: bool, format: FormatArgs) -> BatchConfig {
    if !files.is_empty() {
        batch.files = files;
    }
    format.apply(&mut batch.options);
    if keep_going {
        batch.options.continue_on_error = true;
    }
    batch
}

fn cmd_preview(
    input: &Path,
    output: Option<&Path>,
    format: FormatArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Previewing: {}", input.display());

    let mut options = ReshapeOptions::default();
    format.apply(&mut options);
    options.validate()?;

    let csv = reshape_to_string(input, &options)?;
    write_output(&csv, output)?;

    Ok(())
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", BatchConfig::default().to_json()?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
