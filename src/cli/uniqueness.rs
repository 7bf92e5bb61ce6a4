use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::{open_output, OutputFormat};
use crate::core::tally::count_to_f64;
use crate::reference::{ReferenceStatistics, DEFAULT_READ_LENGTH};

#[derive(Args)]
pub struct UniquenessArgs {
    /// Reference FASTA
    #[arg(required = true)]
    pub reference: PathBuf,

    /// Window width (read length)
    #[arg(long, default_value_t = DEFAULT_READ_LENGTH)]
    pub read_length: usize,

    /// Write the table here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

const UNIQUENESS_COLUMNS: [&str; 4] = ["id", "windows", "unique_windows", "fraction_unique"];

#[derive(Serialize)]
struct UniquenessRow<'a> {
    id: &'a str,
    windows: u64,
    unique_windows: u64,
    fraction_unique: f64,
}

/// Execute uniqueness subcommand
///
/// # Errors
///
/// Returns an error if the reference cannot be read or output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: UniquenessArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if args.read_length == 0 {
        anyhow::bail!("Read length must be positive");
    }

    let stats = ReferenceStatistics::from_fasta(args.read_length, &args.reference)?;

    if verbose {
        eprintln!(
            "{} windows of length {}: {} unique, {} shared between sequences",
            stats.total_windows(),
            stats.read_length(),
            stats.unique_window_total(),
            stats.non_unique_window_total()
        );
    }

    let rows: Vec<UniquenessRow<'_>> = stats
        .window_counts()
        .iter()
        .map(|(id, counts)| UniquenessRow {
            id,
            windows: counts.theoretical,
            unique_windows: counts.unique,
            fraction_unique: if counts.theoretical == 0 {
                0.0
            } else {
                count_to_f64(counts.unique) / count_to_f64(counts.theoretical)
            },
        })
        .collect();

    let mut out = open_output(args.output.as_deref())?;
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_delimited(&rows, b',', &mut out)?,
        OutputFormat::Tsv => write_delimited(&rows, b'\t', &mut out)?,
    }
    out.flush()?;

    Ok(())
}

fn write_delimited(rows: &[UniquenessRow<'_>], delimiter: u8, out: &mut dyn Write) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(out);

    writer.write_record(UNIQUENESS_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
