//! # te-counter
//!
//! A library for counting reads per reference sequence (e.g., transposable-element
//! copies) from pblat alignments, with reference-uniqueness statistics to
//! interpret those counts.
//!
//! Reads from repetitive families often align equally well to several copies.
//! `te-counter` keeps only each read's best-scoring targets and resolves ties
//! several ways so downstream analysis can choose an estimator.
//!
//! ## Features
//!
//! - **Concurrent aggregation**: One reader per aligner worker, fed through named pipes
//! - **Tie resolution**: Unique/non-unique counts, random assignment, fractional split
//! - **Window uniqueness**: Read-length windows of the reference classified as unique or shared
//! - **Normalization**: Expected distinct and unique read positions per target
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//! use rand::SeedableRng;
//! use te_counter::aggregate::{aggregate_stream, merge_tallies};
//!
//! let worker_a = "43\t0\t0\t0\t0\t0\t0\t0\t+\tread1\t43\t0\t43\tTE1\t500\t0\t43\t1\t43,\t0,\t0,\tACGT,\tACGT,\n";
//! let worker_b = "43\t0\t0\t0\t0\t0\t0\t0\t+\tread2\t43\t0\t43\tTE1\t500\t9\t52\t1\t43,\t0,\t9,\tACGT,\tACGT,\n";
//!
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
//! let a = aggregate_stream(Cursor::new(worker_a), &mut rng).unwrap();
//! let b = aggregate_stream(Cursor::new(worker_b), &mut rng).unwrap();
//!
//! let merged = merge_tallies([a, b]);
//! assert_eq!(merged.get("TE1").unwrap().unique_reads, 2);
//! ```
//!
//! ## Modules
//!
//! - [`aggregate`]: Per-query best-hit resolution and merging of worker tallies
//! - [`core`]: Alignment records, tallies, and reference sequences
//! - [`parsing`]: PSLX and FASTA parsers
//! - [`pipeline`]: Named pipes, aligner client, orchestration, and the report
//! - [`reference`]: Window uniqueness statistics
//! - [`cli`]: Command-line interface implementation

pub mod aggregate;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod pipeline;
pub mod reference;

// Re-export commonly used types for convenience
pub use core::record::AlignmentRecord;
pub use core::tally::{TallyTable, TargetTally};
pub use core::types::ReferenceSequence;
pub use pipeline::{Orchestrator, PipelineConfig, PipelineError};
pub use reference::ReferenceStatistics;
