use serde::{Deserialize, Serialize};

/// A single PSLX alignment hit between a query read and a target sequence.
///
/// Block lists (`block_sizes`, `q_starts`, `t_starts`, `q_seqs`, `t_seqs`)
/// all hold `block_count` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    /// Number of matching bases that aren't repeats
    pub matches: u32,
    /// Number of bases that don't match
    pub mismatches: u32,
    /// Number of matching bases that are part of repeats
    pub rep_matches: u32,
    /// Number of 'N' bases
    pub n_count: u32,
    /// Number of inserts in query
    pub q_num_insert: u32,
    /// Number of bases inserted in query
    pub q_base_insert: u32,
    /// Number of inserts in target
    pub t_num_insert: u32,
    /// Number of bases inserted in target
    pub t_base_insert: u32,
    /// `+` or `-` (two characters for translated alignments)
    pub strand: String,
    pub q_name: String,
    pub q_size: u32,
    pub q_start: u32,
    pub q_end: u32,
    pub t_name: String,
    pub t_size: u32,
    pub t_start: u32,
    pub t_end: u32,
    pub block_count: u32,
    pub block_sizes: Vec<u32>,
    pub q_starts: Vec<u32>,
    pub t_starts: Vec<u32>,
    pub q_seqs: Vec<String>,
    pub t_seqs: Vec<String>,
}

impl AlignmentRecord {
    /// Score used to rank a query's hits: the number of matching bases
    #[must_use]
    pub fn score(&self) -> u32 {
        self.matches
    }
}
