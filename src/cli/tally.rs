use std::path::PathBuf;

use clap::Args;

use crate::cli::{open_output, OutputFormat};
use crate::pipeline::{aggregate_files, Report};
use crate::reference::{ReferenceStatistics, DEFAULT_READ_LENGTH};

#[derive(Args)]
pub struct TallyArgs {
    /// PSLX files, one per aligner worker; records of a read must be contiguous
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Reference FASTA used to fill the expectation columns
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Read length, used as the window width for reference statistics
    #[arg(long, default_value_t = DEFAULT_READ_LENGTH)]
    pub read_length: usize,

    /// Seed for random tie-breaking (unseeded by default)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute tally subcommand
///
/// # Errors
///
/// Returns an error if any input cannot be read or decoded, or the reference
/// cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: TallyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if args.read_length == 0 {
        anyhow::bail!("Read length must be positive");
    }

    let tallies = aggregate_files(&args.inputs, args.seed)?;

    if verbose {
        eprintln!(
            "Aggregated {} files into {} targets",
            args.inputs.len(),
            tallies.len()
        );
    }

    let stats = args
        .reference
        .as_deref()
        .map(|path| ReferenceStatistics::from_fasta(args.read_length, path))
        .transpose()?;

    let report = Report::build(&tallies, stats.as_ref());
    let mut out = open_output(args.output.as_deref())?;
    report.write(format.into(), &mut out)?;

    Ok(())
}
