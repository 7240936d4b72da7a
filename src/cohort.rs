//! Largest-cohort analysis over the aggregated tallies.

use crate::models::{AggregatedCounts, CohortVerdict, GenderCategory};

/// Decide whether one category strictly outnumbers everyone else combined,
/// or otherwise collect the categories tied for the top count.
///
/// Majority is strict: a lone leader holding exactly half the total is a
/// plurality. Tie sets keep the categories' presentation order. A zero
/// total degrades to a three-way plurality rather than a panic.
pub fn analyze(counts: &AggregatedCounts, total: usize) -> CohortVerdict {
    let top_count = counts.iter().map(|(_, n)| n).max().unwrap_or(0);
    let top: Vec<GenderCategory> = counts
        .iter()
        .filter(|(_, n)| *n == top_count)
        .map(|(category, _)| category)
        .collect();

    if top.len() == 1 && 2 * top_count > total {
        CohortVerdict::Majority(top[0])
    } else {
        CohortVerdict::Plurality(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_leader_over_half_is_a_majority() {
        let counts = AggregatedCounts::new(2, 11, 7);
        assert_eq!(analyze(&counts, 20), CohortVerdict::Majority(GenderCategory::Men));
    }

    #[test]
    fn lone_leader_at_exactly_half_is_a_plurality() {
        let counts = AggregatedCounts::new(10, 6, 4);
        assert_eq!(
            analyze(&counts, 20),
            CohortVerdict::Plurality(vec![GenderCategory::Women])
        );
    }

    #[test]
    fn lone_leader_under_half_is_a_plurality() {
        let counts = AggregatedCounts::new(1, 9, 10);
        assert_eq!(
            analyze(&counts, 20),
            CohortVerdict::Plurality(vec![GenderCategory::Unknown])
        );
    }

    #[test]
    fn two_way_tie_keeps_presentation_order() {
        let counts = AggregatedCounts::new(2, 9, 9);
        assert_eq!(
            analyze(&counts, 20),
            CohortVerdict::Plurality(vec![GenderCategory::Men, GenderCategory::Unknown])
        );
    }

    #[test]
    fn three_way_tie_lists_every_category() {
        let counts = AggregatedCounts::new(5, 5, 5);
        assert_eq!(
            analyze(&counts, 15),
            CohortVerdict::Plurality(vec![
                GenderCategory::Women,
                GenderCategory::Men,
                GenderCategory::Unknown,
            ])
        );
    }

    #[test]
    fn zero_total_does_not_panic() {
        let counts = AggregatedCounts::new(0, 0, 0);
        assert_eq!(
            analyze(&counts, 0),
            CohortVerdict::Plurality(vec![
                GenderCategory::Women,
                GenderCategory::Men,
                GenderCategory::Unknown,
            ])
        );
    }
}
