use std::io::BufRead;

use rand::Rng;
use tracing::debug;

use crate::aggregate::accumulator::QueryAccumulator;
use crate::core::record::AlignmentRecord;
use crate::core::tally::TallyTable;
use crate::parsing::pslx::{ParseError, PslxReader};

/// Fold a stream of records into per-target tallies.
///
/// Records of one query must be contiguous. The query changes whenever
/// `q_name` differs from the previous record's.
///
/// # Errors
///
/// Returns the first decode error; nothing is tallied for the stream then.
pub fn aggregate_records<I, R>(records: I, rng: &mut R) -> Result<TallyTable, ParseError>
where
    I: IntoIterator<Item = Result<AlignmentRecord, ParseError>>,
    R: Rng + ?Sized,
{
    let mut tallies = TallyTable::new();
    let mut current: Option<QueryAccumulator> = None;
    let mut queries = 0usize;

    for record in records {
        let record = record?;

        if current
            .as_ref()
            .is_some_and(|acc| acc.q_name() != record.q_name)
        {
            if let Some(done) = current.take() {
                done.save(&mut tallies, rng);
            }
        }

        let acc = current.get_or_insert_with(|| {
            queries += 1;
            QueryAccumulator::new(record.q_name.as_str())
        });
        acc.update(&record.t_name, record.score());
    }

    if let Some(done) = current {
        done.save(&mut tallies, rng);
    }

    debug!(queries, targets = tallies.len(), "Aggregated alignment stream");
    Ok(tallies)
}

/// Decode and fold a whole PSLX stream.
///
/// # Errors
///
/// Returns `ParseError::Io` on read failure or `ParseError::MalformedRecord`
/// on the first bad line.
pub fn aggregate_stream<B: BufRead, R: Rng + ?Sized>(
    reader: B,
    rng: &mut R,
) -> Result<TallyTable, ParseError> {
    aggregate_records(PslxReader::new(reader), rng)
}
