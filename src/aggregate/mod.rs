//! Folding alignment streams into per-target read counts.
//!
//! - [`accumulator`]: best-score tracking for one query and the apportionment rule
//! - [`worker`]: folds a whole record stream, one accumulator per query
//! - [`merge`]: sums the tables produced by concurrent workers

pub mod accumulator;
pub mod merge;
pub mod worker;

pub use accumulator::QueryAccumulator;
pub use merge::merge_tallies;
pub use worker::{aggregate_records, aggregate_stream};
