use crate::core::tally::TallyTable;

/// Combine per-worker tables into one.
///
/// The result holds the union of all target names; every counter is the
/// sum over the tables containing that target.
pub fn merge_tallies<I>(tables: I) -> TallyTable
where
    I: IntoIterator<Item = TallyTable>,
{
    tables
        .into_iter()
        .fold(TallyTable::new(), |mut merged, table| {
            merged.absorb(table);
            merged
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tally::TargetTally;

    fn table(entries: &[(&str, TargetTally)]) -> TallyTable {
        entries
            .iter()
            .map(|(name, tally)| ((*name).to_string(), *tally))
            .collect()
    }

    fn unique(n: u64) -> TargetTally {
        TargetTally {
            unique_reads: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_workers_same_target() {
        let merged = merge_tallies(vec![table(&[("T1", unique(1))]), table(&[("T1", unique(1))])]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.get("T1"),
            Some(&TargetTally {
                non_unique_reads: 0,
                unique_reads: 2,
                randomly_mapped_reads: 0,
                split_reads: 0.0,
            })
        );
    }

    #[test]
    fn test_key_set_is_union_and_sums_exact() {
        let a = TargetTally {
            non_unique_reads: 2,
            unique_reads: 1,
            randomly_mapped_reads: 1,
            split_reads: 1.5,
        };
        let b = TargetTally {
            non_unique_reads: 1,
            unique_reads: 4,
            randomly_mapped_reads: 3,
            split_reads: 4.25,
        };
        let merged = merge_tallies(vec![
            table(&[("T1", a), ("T2", b)]),
            table(&[("T2", a)]),
            table(&[("T3", b)]),
            TallyTable::new(),
        ]);

        let names: Vec<&str> = merged.target_names().collect();
        assert_eq!(names, vec!["T1", "T2", "T3"]);
        assert_eq!(merged.get("T1"), Some(&a));
        assert_eq!(merged.get("T3"), Some(&b));

        let t2 = merged.get("T2").unwrap();
        assert_eq!(t2.non_unique_reads, 3);
        assert_eq!(t2.unique_reads, 5);
        assert_eq!(t2.randomly_mapped_reads, 4);
        assert!((t2.split_reads - 5.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_tables() {
        assert!(merge_tallies(Vec::new()).is_empty());
    }
}
