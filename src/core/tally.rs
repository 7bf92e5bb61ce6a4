use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::ops::AddAssign;

/// Helper function to convert a read count to f64 with explicit precision loss allowance
#[inline]
pub(crate) fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Accumulated read counts for one target sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetTally {
    /// Reads whose best-scoring target set contained more than one target
    pub non_unique_reads: u64,

    /// Reads whose best-scoring target set was this target alone
    pub unique_reads: u64,

    /// Tied reads credited to this target by a uniform random draw
    pub randomly_mapped_reads: u64,

    /// Each read contributes 1/k to each of its k best-scoring targets
    pub split_reads: f64,
}

impl TargetTally {
    #[must_use]
    pub fn total_reads(&self) -> u64 {
        self.unique_reads + self.non_unique_reads
    }

    /// Fraction of reads on this target that were unique (0 when there are none)
    #[must_use]
    pub fn unique_over_total(&self) -> f64 {
        let total = self.total_reads();
        if total == 0 {
            0.0
        } else {
            count_to_f64(self.unique_reads) / count_to_f64(total)
        }
    }
}

impl AddAssign<&TargetTally> for TargetTally {
    fn add_assign(&mut self, other: &TargetTally) {
        self.non_unique_reads += other.non_unique_reads;
        self.unique_reads += other.unique_reads;
        self.randomly_mapped_reads += other.randomly_mapped_reads;
        self.split_reads += other.split_reads;
    }
}

/// Per-target tallies keyed by target name, iterated in name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TallyTable {
    targets: BTreeMap<String, TargetTally>,
}

impl TallyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tally for a target, creating an empty one on first reference
    pub fn entry(&mut self, target: &str) -> &mut TargetTally {
        self.targets.entry(target.to_string()).or_default()
    }

    #[must_use]
    pub fn get(&self, target: &str) -> Option<&TargetTally> {
        self.targets.get(target)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, TargetTally> {
        self.targets.iter()
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Add every counter of `other` into this table, key by key
    pub fn absorb(&mut self, other: TallyTable) {
        for (name, tally) in other.targets {
            *self.targets.entry(name).or_default() += &tally;
        }
    }
}

impl FromIterator<(String, TargetTally)> for TallyTable {
    fn from_iter<I: IntoIterator<Item = (String, TargetTally)>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TallyTable {
    type Item = (&'a String, &'a TargetTally);
    type IntoIter = btree_map::Iter<'a, String, TargetTally>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}
