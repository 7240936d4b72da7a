//! Status text and alt text composition.

use itertools::Itertools;

use crate::cohort;
use crate::hashtag::build_hashtag;
use crate::models::{AggregatedCounts, CohortVerdict};

/// Subject page linked at the end of every status.
const PERMALINK_BASE: &str = "https://www.themoviedb.org/movie";

/// Phrase substituted for the bare `unknown` label in plurality sentences.
const UNKNOWN_PHRASE: &str = "of unknown gender";

/// The sentence fragment describing the verdict, e.g. `the majority were
/// men` or `the plurality were of unknown gender or men`. Tied labels are
/// joined in reverse lexicographic order.
pub fn compose_summary(verdict: &CohortVerdict) -> String {
    match verdict {
        CohortVerdict::Majority(category) => {
            format!("the majority were {}", category.label().to_lowercase())
        }
        CohortVerdict::Plurality(tied) => {
            let joined = tied
                .iter()
                .map(|category| category.label().to_lowercase())
                .sorted()
                .rev()
                .join(" or ");
            format!(
                "the plurality were {}",
                joined.replacen("unknown", UNKNOWN_PHRASE, 1)
            )
        }
    }
}

/// The full status body: one sentence about the breakdown, then the
/// subject permalink on its own paragraph.
pub fn compose_tweet_text(
    cast_member_count: usize,
    title: &str,
    year: &str,
    counts: &AggregatedCounts,
    subject_id: u64,
) -> String {
    let verdict = cohort::analyze(counts, cast_member_count);
    format!(
        "Of the {} top-billed cast members in {} ({}), {}.\n\n{}/{}",
        cast_member_count,
        build_hashtag(title),
        year,
        compose_summary(&verdict),
        PERMALINK_BASE,
        subject_id
    )
}

/// Image alt text listing every category and its count.
pub fn compose_alt_text(counts: &AggregatedCounts) -> String {
    counts
        .iter()
        .map(|(category, count)| format!("{}: {}", category.label(), count))
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenderCategory;

    #[test]
    fn alt_text_lists_every_category_in_order() {
        let counts = AggregatedCounts::new(12, 4, 4);
        assert_eq!(compose_alt_text(&counts), "Women: 12; Men: 4; Unknown: 4");
    }

    #[test]
    fn alt_text_keeps_zero_counts() {
        let counts = AggregatedCounts::new(0, 20, 0);
        assert_eq!(compose_alt_text(&counts), "Women: 0; Men: 20; Unknown: 0");
    }

    #[test]
    fn majority_summary_uses_the_bare_label() {
        let verdict = CohortVerdict::Majority(GenderCategory::Men);
        assert_eq!(compose_summary(&verdict), "the majority were men");
    }

    #[test]
    fn majority_of_unknown_stays_bare() {
        let verdict = CohortVerdict::Majority(GenderCategory::Unknown);
        assert_eq!(compose_summary(&verdict), "the majority were unknown");
    }

    #[test]
    fn plurality_of_unknown_becomes_a_phrase() {
        let verdict = CohortVerdict::Plurality(vec![GenderCategory::Unknown]);
        assert_eq!(compose_summary(&verdict), "the plurality were of unknown gender");
    }

    #[test]
    fn tied_plurality_joins_in_reverse_lexicographic_order() {
        let verdict =
            CohortVerdict::Plurality(vec![GenderCategory::Men, GenderCategory::Unknown]);
        assert_eq!(
            compose_summary(&verdict),
            "the plurality were of unknown gender or men"
        );

        let verdict = CohortVerdict::Plurality(vec![GenderCategory::Women, GenderCategory::Men]);
        assert_eq!(compose_summary(&verdict), "the plurality were women or men");
    }

    #[test]
    fn three_way_tie_joins_all_labels() {
        let verdict = CohortVerdict::Plurality(vec![
            GenderCategory::Women,
            GenderCategory::Men,
            GenderCategory::Unknown,
        ]);
        assert_eq!(
            compose_summary(&verdict),
            "the plurality were women or of unknown gender or men"
        );
    }

    #[test]
    fn plurality_status_reads_end_to_end() {
        let counts = AggregatedCounts::new(1, 9, 10);
        let text = compose_tweet_text(20, "Space Jam", "1996", &counts, 2300);
        assert_eq!(
            text,
            "Of the 20 top-billed cast members in #SpaceJam (1996), the plurality \
             were of unknown gender.\n\nhttps://www.themoviedb.org/movie/2300"
        );
    }

    #[test]
    fn majority_status_reads_end_to_end() {
        let counts = AggregatedCounts::new(2, 11, 7);
        let text = compose_tweet_text(20, "Space Jam", "1996", &counts, 2300);
        assert_eq!(
            text,
            "Of the 20 top-billed cast members in #SpaceJam (1996), the majority \
             were men.\n\nhttps://www.themoviedb.org/movie/2300"
        );
    }

    #[test]
    fn tied_status_reads_end_to_end() {
        let counts = AggregatedCounts::new(2, 8, 8);
        let text = compose_tweet_text(18, "Space Jam", "1996", &counts, 2300);
        assert_eq!(
            text,
            "Of the 18 top-billed cast members in #SpaceJam (1996), the plurality \
             were of unknown gender or men.\n\nhttps://www.themoviedb.org/movie/2300"
        );
    }
}
