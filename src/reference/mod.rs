//! Reference-genome uniqueness statistics.
//!
//! Every reference sequence is cut into overlapping windows of the read length.
//! Windows are upper-cased, sorted and grouped; a window seen in only one
//! reference identifier is *unique* to it. The per-identifier totals give the
//! expected number of distinct and uniquely-attributable read positions used
//! to normalize observed counts.
//!
//! ## Example
//!
//! ```rust
//! use te_counter::core::types::ReferenceSequence;
//! use te_counter::reference::ReferenceStatistics;
//!
//! let refs = vec![ReferenceSequence::new("R1", "AAAACCCC")];
//! let stats = ReferenceStatistics::compute(4, &refs);
//! assert_eq!(stats.theoretical_count("R1"), 5);
//! assert_eq!(stats.unique_window_count("R1"), 5);
//! ```

pub mod uniqueness;

pub use uniqueness::{ReferenceStatistics, WindowCounts, DEFAULT_READ_LENGTH};
