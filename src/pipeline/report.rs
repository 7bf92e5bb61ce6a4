//! The final expression table.
//!
//! | Column | Meaning |
//! |--------|---------|
//! | TE | Target identifier |
//! | non-unique_reads | Reads tied between this and other targets |
//! | unique_reads | Reads mapping best to this target alone |
//! | randomly_mapped_reads | Reads credited here by random tie-breaking |
//! | split_reads | Reads apportioned 1/k over k tied targets |
//! | fraction_unique | unique / (unique + non-unique) |
//! | exp_distinct_reads | Read-length windows in the target's sequence |
//! | exp_unique_reads | Windows found in this target only |
//! | RPU | Unique reads per unique window |

use std::io::Write;

use serde::Serialize;

use crate::core::tally::{count_to_f64, TallyTable};
use crate::pipeline::PipelineError;
use crate::reference::ReferenceStatistics;

/// Column names, in output order
pub const REPORT_COLUMNS: [&str; 9] = [
    "TE",
    "non-unique_reads",
    "unique_reads",
    "randomly_mapped_reads",
    "split_reads",
    "fraction_unique",
    "exp_distinct_reads",
    "exp_unique_reads",
    "RPU",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Tsv,
    Json,
}

/// One output row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "TE")]
    pub target: String,
    #[serde(rename = "non-unique_reads")]
    pub non_unique_reads: u64,
    pub unique_reads: u64,
    pub randomly_mapped_reads: u64,
    pub split_reads: f64,
    pub fraction_unique: f64,
    pub exp_distinct_reads: u64,
    pub exp_unique_reads: u64,
    #[serde(rename = "RPU")]
    pub rpu: f64,
}

/// Rows for every tallied target, sorted by target name
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Join tallies with reference statistics.
    ///
    /// Without statistics the expectation columns are zero.
    #[must_use]
    pub fn build(tallies: &TallyTable, stats: Option<&ReferenceStatistics>) -> Self {
        let rows = tallies
            .iter()
            .map(|(target, tally)| {
                let exp_distinct_reads = stats.map_or(0, |s| s.theoretical_count(target));
                let exp_unique_reads = stats.map_or(0, |s| s.unique_window_count(target));
                let rpu = if exp_unique_reads == 0 {
                    0.0
                } else {
                    count_to_f64(tally.unique_reads) / count_to_f64(exp_unique_reads)
                };

                ReportRow {
                    target: target.clone(),
                    non_unique_reads: tally.non_unique_reads,
                    unique_reads: tally.unique_reads,
                    randomly_mapped_reads: tally.randomly_mapped_reads,
                    split_reads: tally.split_reads,
                    fraction_unique: tally.unique_over_total(),
                    exp_distinct_reads,
                    exp_unique_reads,
                    rpu,
                }
            })
            .collect();

        Self { rows }
    }

    /// Write the report with a header row (CSV/TSV) or as a JSON array.
    ///
    /// Fields containing the delimiter or a quote are quoted. The header is
    /// written even when there are no rows.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Csv`, `PipelineError::Json` or
    /// `PipelineError::Io` if writing fails.
    pub fn write<W: Write>(&self, format: ReportFormat, out: &mut W) -> Result<(), PipelineError> {
        match format {
            ReportFormat::Csv => self.write_delimited(b',', out)?,
            ReportFormat::Tsv => self.write_delimited(b'\t', out)?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        out.flush()?;
        Ok(())
    }

    fn write_delimited<W: Write>(&self, delimiter: u8, out: &mut W) -> Result<(), PipelineError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(out);

        writer.write_record(REPORT_COLUMNS)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
