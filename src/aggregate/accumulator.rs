use rand::seq::IndexedRandom;
use rand::Rng;

use crate::core::tally::{count_to_f64, TallyTable};

/// Best-scoring targets seen so far for one query read
#[derive(Debug, Clone)]
pub struct QueryAccumulator {
    q_name: String,
    best_score: u32,
    /// Targets tied at `best_score`, in first-seen order, without duplicates
    targets: Vec<String>,
}

impl QueryAccumulator {
    pub fn new(q_name: impl Into<String>) -> Self {
        Self {
            q_name: q_name.into(),
            best_score: 0,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn q_name(&self) -> &str {
        &self.q_name
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Fold in one hit of this query
    pub fn update(&mut self, target: &str, score: u32) {
        if score > self.best_score || self.targets.is_empty() {
            self.targets.clear();
            self.targets.push(target.to_string());
            self.best_score = score;
        } else if score == self.best_score && !self.targets.iter().any(|t| t == target) {
            self.targets.push(target.to_string());
        }
    }

    /// Credit this read to its best-scoring targets.
    ///
    /// Does nothing if no hit was ever recorded.
    pub fn save<R: Rng + ?Sized>(&self, tallies: &mut TallyTable, rng: &mut R) {
        let Some(chosen) = self.targets.choose(rng) else {
            return;
        };

        let split = 1.0 / count_to_f64(self.targets.len() as u64);
        let is_unique = self.targets.len() == 1;

        for target in &self.targets {
            let tally = tallies.entry(target);
            if is_unique {
                tally.unique_reads += 1;
            } else {
                tally.non_unique_reads += 1;
            }
            tally.split_reads += split;
        }

        tallies.entry(chosen).randomly_mapped_reads += 1;
    }
}
