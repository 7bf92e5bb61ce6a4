//! Parsers for aligner output and reference sequences.
//!
//! This module provides parsers for:
//!
//! - **PSLX records**: BLAT's tab-delimited alignment format with block sequences
//! - **FASTA files**: Reference sequences, plain or gzip/bgzip compressed
//!
//! ## Example
//!
//! ```rust,no_run
//! use te_counter::parsing::pslx::PslxReader;
//! use std::io::BufReader;
//!
//! let file = std::fs::File::open("hits.pslx").unwrap();
//! for record in PslxReader::new(BufReader::new(file)) {
//!     let record = record.unwrap();
//!     println!("{} -> {} ({})", record.q_name, record.t_name, record.score());
//! }
//! ```
//!
//! ## PSLX Columns
//!
//! | # | Column | Type |
//! |---|--------|------|
//! | 1-8 | match, misMatch, repMatch, nCount, qNumInsert, qBaseInsert, tNumInsert, tBaseInsert | integer |
//! | 9 | strand | text |
//! | 10 | qName | text |
//! | 11-13 | qSize, qStart, qEnd | integer |
//! | 14 | tName | text |
//! | 15-17 | tSize, tStart, tEnd | integer |
//! | 18 | blockCount | integer |
//! | 19-21 | blockSizes, qStarts, tStarts | integer list |
//! | 22-23 | qSeqs, tSeqs | text list |

pub mod fasta;
pub mod pslx;
