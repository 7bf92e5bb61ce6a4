//! Command-line interface for te-counter.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **count**: Align reads with pblat and count expression per reference sequence
//! - **tally**: Count expression from existing PSLX files
//! - **uniqueness**: Report read-length window uniqueness of a reference
//!
//! ## Usage
//!
//! ```text
//! # Full run: align, aggregate, and join with reference statistics
//! te-counter count copia.fa sample_01.fasta --min-identity 0.95 -t 30
//!
//! # Aggregate PSLX files written earlier
//! te-counter tally hits.0.pslx hits.1.pslx --reference copia.fa
//!
//! # JSON output for scripting
//! te-counter uniqueness copia.fa --read-length 43 --format json
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::pipeline::ReportFormat;

pub mod count;
pub mod tally;
pub mod uniqueness;

#[derive(Parser)]
#[command(name = "te-counter")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Count transposable-element expression from pblat alignments")]
#[command(
    long_about = "te-counter aligns reads against a set of reference sequences (e.g., transposable-element copies) with pblat and counts reads per sequence.\n\nMulti-mapping reads are resolved four ways:\n- unique and non-unique read counts\n- a random draw among tied targets\n- a fractional split over tied targets\n\nCounts are joined with read-length window uniqueness of the reference."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "csv")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align reads with pblat and count expression per reference sequence
    Count(count::CountArgs),

    /// Count expression from existing PSLX files
    Tally(tally::TallyArgs),

    /// Report window uniqueness of each reference sequence
    Uniqueness(uniqueness::UniquenessArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Tsv => ReportFormat::Tsv,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Open the output file, or stdout when no path is given
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}
