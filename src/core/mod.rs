//! Core data types for alignment aggregation.
//!
//! - [`AlignmentRecord`](record::AlignmentRecord): one PSLX hit of a read against a target
//! - [`TargetTally`](tally::TargetTally), [`TallyTable`](tally::TallyTable): per-target read counts
//! - [`ReferenceSequence`](types::ReferenceSequence): a named reference sequence
//!
//! ## Read apportionment
//!
//! A read whose best score is shared by k targets is counted four ways:
//!
//! | Counter | k = 1 | k > 1 |
//! |---------|-------|-------|
//! | unique_reads | +1 | - |
//! | non_unique_reads | - | +1 on every target |
//! | split_reads | +1 | +1/k on every target |
//! | randomly_mapped_reads | +1 | +1 on one target drawn uniformly |

pub mod record;
pub mod tally;
pub mod types;
