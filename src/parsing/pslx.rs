//! Decoder for BLAT PSLX alignment records.
//!
//! Each line holds 23 tab-separated fields. The last five are comma-separated
//! lists (BLAT writes them with a trailing comma), one entry per aligned block.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use thiserror::Error;

use crate::core::record::AlignmentRecord;

/// Number of tab-separated fields in a PSLX line
pub const PSLX_FIELD_COUNT: usize = 23;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl ParseError {
    fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

/// Parse one PSLX line into an [`AlignmentRecord`].
///
/// `line_num` is only used for error messages (1-based).
///
/// # Errors
///
/// Returns `ParseError::MalformedRecord` if the line does not have exactly
/// 23 fields, a numeric field fails to parse, or a block list does not have
/// `blockCount` entries.
pub fn parse_pslx_line(line: &str, line_num: usize) -> Result<AlignmentRecord, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != PSLX_FIELD_COUNT {
        return Err(ParseError::malformed(
            line_num,
            format!(
                "expected {PSLX_FIELD_COUNT} fields, found {}",
                fields.len()
            ),
        ));
    }

    let int = |idx: usize, name: &str| -> Result<u32, ParseError> {
        fields[idx].trim().parse().map_err(|_| {
            ParseError::malformed(line_num, format!("invalid {name}: '{}'", fields[idx]))
        })
    };

    let record = AlignmentRecord {
        matches: int(0, "match")?,
        mismatches: int(1, "misMatch")?,
        rep_matches: int(2, "repMatch")?,
        n_count: int(3, "nCount")?,
        q_num_insert: int(4, "qNumInsert")?,
        q_base_insert: int(5, "qBaseInsert")?,
        t_num_insert: int(6, "tNumInsert")?,
        t_base_insert: int(7, "tBaseInsert")?,
        strand: fields[8].to_string(),
        q_name: fields[9].to_string(),
        q_size: int(10, "qSize")?,
        q_start: int(11, "qStart")?,
        q_end: int(12, "qEnd")?,
        t_name: fields[13].to_string(),
        t_size: int(14, "tSize")?,
        t_start: int(15, "tStart")?,
        t_end: int(16, "tEnd")?,
        block_count: int(17, "blockCount")?,
        block_sizes: parse_list(fields[18], "blockSizes", line_num)?,
        q_starts: parse_list(fields[19], "qStarts", line_num)?,
        t_starts: parse_list(fields[20], "tStarts", line_num)?,
        q_seqs: parse_list(fields[21], "qSeqs", line_num)?,
        t_seqs: parse_list(fields[22], "tSeqs", line_num)?,
    };

    let expected = record.block_count as usize;
    for (name, len) in [
        ("blockSizes", record.block_sizes.len()),
        ("qStarts", record.q_starts.len()),
        ("tStarts", record.t_starts.len()),
        ("qSeqs", record.q_seqs.len()),
        ("tSeqs", record.t_seqs.len()),
    ] {
        if len != expected {
            return Err(ParseError::malformed(
                line_num,
                format!("{name} has {len} entries but blockCount is {expected}"),
            ));
        }
    }

    Ok(record)
}

/// Parse a comma-separated list, skipping empty entries (BLAT's trailing comma)
fn parse_list<T: FromStr>(field: &str, name: &str, line_num: usize) -> Result<Vec<T>, ParseError> {
    field
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| ParseError::malformed(line_num, format!("invalid {name} entry: '{s}'")))
        })
        .collect()
}

/// Streaming reader over PSLX records.
///
/// Yields one `Result` per non-blank line and ends at end of input. The
/// reader cannot be rewound.
pub struct PslxReader<R> {
    inner: R,
    buf: Vec<u8>,
    line_num: usize,
}

impl<R: BufRead> PslxReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            line_num: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_num
    }
}

impl<R: BufRead> Iterator for PslxReader<R> {
    type Item = Result<AlignmentRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_num += 1;
                    let Ok(line) = std::str::from_utf8(&self.buf) else {
                        return Some(Err(ParseError::malformed(
                            self.line_num,
                            "line is not valid UTF-8",
                        )));
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(parse_pslx_line(line, self.line_num));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Write a list the way BLAT does: every entry followed by a comma
fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for item in items {
        write!(f, "{item},")?;
    }
    Ok(())
}

impl fmt::Display for AlignmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t",
            self.matches,
            self.mismatches,
            self.rep_matches,
            self.n_count,
            self.q_num_insert,
            self.q_base_insert,
            self.t_num_insert,
            self.t_base_insert,
            self.strand,
            self.q_name,
            self.q_size,
            self.q_start,
            self.q_end,
            self.t_name,
            self.t_size,
            self.t_start,
            self.t_end,
            self.block_count,
        )?;
        write_list(f, &self.block_sizes)?;
        f.write_str("\t")?;
        write_list(f, &self.q_starts)?;
        f.write_str("\t")?;
        write_list(f, &self.t_starts)?;
        f.write_str("\t")?;
        write_list(f, &self.q_seqs)?;
        f.write_str("\t")?;
        write_list(f, &self.t_seqs)
    }
}
