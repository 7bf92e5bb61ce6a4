use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::core::types::ReferenceSequence;
use crate::parsing::fasta::read_reference_sequences;
use crate::parsing::pslx::ParseError;

/// Default read length used as the window width
pub const DEFAULT_READ_LENGTH: usize = 43;

/// Window statistics for one reference identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowCounts {
    /// Windows drawn from this identifier's sequence, with multiplicity
    pub theoretical: u64,

    /// Distinct windows found only in this identifier
    pub unique: u64,
}

/// Uniqueness of every read-length window across a reference collection.
///
/// Window text is upper-cased before comparison. A window is unique when all
/// of its occurrences come from the same identifier, even if it occurs more
/// than once there.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStatistics {
    read_length: usize,

    /// Identifiers in first-seen order; windows refer to them by index
    ids: Vec<String>,

    /// Window -> identifier index of each occurrence (all equal)
    unique_windows: HashMap<Vec<u8>, Vec<usize>>,

    /// Window -> identifier index of each occurrence (at least two distinct)
    non_unique_windows: HashMap<Vec<u8>, Vec<usize>>,

    counts: BTreeMap<String, WindowCounts>,
}

impl ReferenceStatistics {
    /// Analyze all windows of width `read_length` in `sequences`.
    ///
    /// Sequences shorter than `read_length` contribute nothing. A width of
    /// zero produces no windows.
    pub fn compute(read_length: usize, sequences: &[ReferenceSequence]) -> Self {
        let mut ids: Vec<String> = Vec::new();
        let mut id_index: HashMap<&str, usize> = HashMap::new();
        let mut canonical: Vec<(Vec<u8>, usize)> = Vec::with_capacity(sequences.len());

        for seq in sequences {
            let idx = *id_index.entry(seq.id.as_str()).or_insert_with(|| {
                ids.push(seq.id.clone());
                ids.len() - 1
            });
            canonical.push((seq.sequence.to_ascii_uppercase(), idx));
        }

        let mut windows: Vec<(&[u8], usize)> = Vec::new();
        if read_length > 0 {
            for (residues, idx) in &canonical {
                windows.extend(residues.windows(read_length).map(|w| (w, *idx)));
            }
        }
        // Stable sort keeps identifiers of a group in input order
        windows.sort_by(|a, b| a.0.cmp(b.0));

        let mut stats = Self {
            read_length,
            ..Self::default()
        };
        let mut theoretical = vec![0u64; ids.len()];
        let mut unique = vec![0u64; ids.len()];

        let mut start = 0;
        while start < windows.len() {
            let window = windows[start].0;
            let mut end = start + 1;
            while end < windows.len() && windows[end].0 == window {
                end += 1;
            }

            let group: Vec<usize> = windows[start..end].iter().map(|(_, idx)| *idx).collect();
            for &idx in &group {
                theoretical[idx] += 1;
            }

            if group.iter().all(|&idx| idx == group[0]) {
                unique[group[0]] += 1;
                stats.unique_windows.insert(window.to_vec(), group);
            } else {
                stats.non_unique_windows.insert(window.to_vec(), group);
            }

            start = end;
        }

        for (idx, id) in ids.iter().enumerate() {
            if theoretical[idx] > 0 {
                stats.counts.insert(
                    id.clone(),
                    WindowCounts {
                        theoretical: theoretical[idx],
                        unique: unique[idx],
                    },
                );
            }
        }
        stats.ids = ids;

        info!(
            read_length,
            windows = windows.len(),
            unique = stats.unique_windows.len(),
            non_unique = stats.non_unique_windows.len(),
            "Computed reference window statistics"
        );

        stats
    }

    /// Read a FASTA file and analyze it.
    ///
    /// # Errors
    ///
    /// Returns any error from reading the FASTA file.
    pub fn from_fasta(read_length: usize, path: &Path) -> Result<Self, ParseError> {
        let sequences = read_reference_sequences(path)?;
        Ok(Self::compute(read_length, &sequences))
    }

    #[must_use]
    pub fn read_length(&self) -> usize {
        self.read_length
    }

    /// Windows drawn from `id`, counting every occurrence
    #[must_use]
    pub fn theoretical_count(&self, id: &str) -> u64 {
        self.counts.get(id).map_or(0, |c| c.theoretical)
    }

    /// Distinct windows attributable to `id` alone
    #[must_use]
    pub fn unique_window_count(&self, id: &str) -> u64 {
        self.counts.get(id).map_or(0, |c| c.unique)
    }

    /// Per-identifier counts for every identifier that produced windows
    #[must_use]
    pub fn window_counts(&self) -> &BTreeMap<String, WindowCounts> {
        &self.counts
    }

    /// Total number of windows generated across all sequences
    #[must_use]
    pub fn total_windows(&self) -> u64 {
        self.counts.values().map(|c| c.theoretical).sum()
    }

    #[must_use]
    pub fn unique_window_total(&self) -> usize {
        self.unique_windows.len()
    }

    #[must_use]
    pub fn non_unique_window_total(&self) -> usize {
        self.non_unique_windows.len()
    }

    /// Whether `window` (any case) occurs in exactly one identifier
    #[must_use]
    pub fn is_unique_window(&self, window: &[u8]) -> bool {
        self.unique_windows
            .contains_key(&window.to_ascii_uppercase())
    }

    /// Identifiers of every occurrence of `window`, or `None` if it never occurs
    #[must_use]
    pub fn window_sources(&self, window: &[u8]) -> Option<Vec<&str>> {
        let key = window.to_ascii_uppercase();
        self.unique_windows
            .get(&key)
            .or_else(|| self.non_unique_windows.get(&key))
            .map(|group| group.iter().map(|&idx| self.ids[idx].as_str()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seqs(entries: &[(&str, &str)]) -> Vec<ReferenceSequence> {
        entries
            .iter()
            .map(|(id, s)| ReferenceSequence::new(*id, s.as_bytes()))
            .collect()
    }

    #[test]
    fn test_single_sequence_all_unique() {
        let stats = ReferenceStatistics::compute(4, &seqs(&[("R1", "AAAACCCC")]));
        assert_eq!(stats.theoretical_count("R1"), 5);
        assert_eq!(stats.unique_window_count("R1"), 5);
        assert_eq!(stats.unique_window_total(), 5);
        assert_eq!(stats.non_unique_window_total(), 0);
        for w in ["AAAA", "AAAC", "AACC", "ACCC", "CCCC"] {
            assert!(stats.is_unique_window(w.as_bytes()));
        }
    }

    #[test]
    fn test_repeat_within_one_sequence_is_unique() {
        let stats = ReferenceStatistics::compute(3, &seqs(&[("R1", "ACGACG")]));
        // ACG, CGA, GAC, ACG
        assert_eq!(stats.theoretical_count("R1"), 4);
        assert_eq!(stats.unique_window_count("R1"), 3);
        assert_eq!(stats.window_sources(b"ACG"), Some(vec!["R1", "R1"]));
        assert_eq!(stats.non_unique_window_total(), 0);
    }

    #[test]
    fn test_shared_window_is_non_unique() {
        let stats = ReferenceStatistics::compute(4, &seqs(&[("R1", "AAAACC"), ("R2", "GGAAAA")]));
        assert!(!stats.is_unique_window(b"AAAA"));
        assert_eq!(stats.window_sources(b"AAAA"), Some(vec!["R1", "R2"]));
        assert_eq!(stats.theoretical_count("R1"), 3);
        assert_eq!(stats.theoretical_count("R2"), 3);
        assert_eq!(stats.unique_window_count("R1"), 2);
        assert_eq!(stats.unique_window_count("R2"), 2);
    }

    #[test]
    fn test_case_is_normalized() {
        let stats = ReferenceStatistics::compute(4, &seqs(&[("R1", "acgtt"), ("R2", "ACGTA")]));
        assert!(!stats.is_unique_window(b"ACGT"));
        assert!(!stats.is_unique_window(b"acgt"));
        assert_eq!(stats.non_unique_window_total(), 1);
    }

    #[test]
    fn test_short_sequence_contributes_nothing() {
        let stats = ReferenceStatistics::compute(10, &seqs(&[("short", "ACGT"), ("long", "ACGTACGTACGT")]));
        assert_eq!(stats.theoretical_count("short"), 0);
        assert!(!stats.window_counts().contains_key("short"));
        assert_eq!(stats.theoretical_count("long"), 3);
    }

    #[test]
    fn test_total_windows_matches_sequence_lengths() {
        let input = seqs(&[
            ("A", "ACGTTGCAACGTAGGT"),
            ("B", "TTGCAACG"),
            ("C", "AC"),
            ("D", "acgttgcaacgt"),
        ]);
        let width = 5;
        let expected: usize = input.iter().map(|s| s.window_count(width)).sum();

        let stats = ReferenceStatistics::compute(width, &input);
        assert_eq!(stats.total_windows(), expected as u64);
    }

    #[test]
    fn test_zero_width_has_no_windows() {
        let stats = ReferenceStatistics::compute(0, &seqs(&[("R1", "ACGT")]));
        assert_eq!(stats.total_windows(), 0);
    }
}
