use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The film a run is about, built from the provider's first search result.
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: u64,
    pub title: String,
    /// Release date as the provider sends it, `YYYY-MM-DD` or empty.
    pub release_date: String,
}

impl Subject {
    /// Leading year of the release date, empty when the provider sent none.
    pub fn year(&self) -> &str {
        self.release_date.split('-').next().unwrap_or("")
    }
}

/// One billed cast entry for the run in progress, never persisted.
#[derive(Debug, Clone)]
pub struct CastMember {
    pub name: String,
    /// Raw provider gender code, absent when the provider sent null.
    pub gender_code: Option<i64>,
}

/// Gender categories in their fixed presentation order. Aggregation
/// output, alt text, and chart rows all follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenderCategory {
    Women,
    Men,
    Unknown,
}

impl GenderCategory {
    pub fn label(self) -> &'static str {
        match self {
            GenderCategory::Women => "Women",
            GenderCategory::Men => "Men",
            GenderCategory::Unknown => "Unknown",
        }
    }
}

/// Per-category tallies covering every category, zero counts included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCounts {
    pairs: [(GenderCategory, usize); 3],
}

impl AggregatedCounts {
    pub fn new(women: usize, men: usize, unknown: usize) -> Self {
        Self {
            pairs: [
                (GenderCategory::Women, women),
                (GenderCategory::Men, men),
                (GenderCategory::Unknown, unknown),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GenderCategory, usize)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.pairs.iter().map(|(_, n)| *n).sum()
    }
}

/// Outcome of the largest-cohort analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CohortVerdict {
    /// One category holds a strict majority of the tally.
    Majority(GenderCategory),
    /// The categories tied for the top count, in presentation order.
    Plurality(Vec<GenderCategory>),
}

/// One main-timeline post, as stored in the history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub subject_id: u64,
    pub date_posted: NaiveDate,
}

/// The status a reply should attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub status_id: String,
    pub screen_name: String,
}

/// Everything one publish leg needs. Built once per run and cloned for
/// the reply leg when a mention triggered the run.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub subject_id: u64,
    pub title: String,
    pub year: String,
    pub cast_member_count: usize,
    pub counts: AggregatedCounts,
    pub image_png: Vec<u8>,
    pub reply: Option<ReplyTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_is_leading_date_segment() {
        let subject = Subject {
            id: 2300,
            title: "Space Jam".to_string(),
            release_date: "1996-11-15".to_string(),
        };
        assert_eq!(subject.year(), "1996");
    }

    #[test]
    fn year_of_empty_release_date_is_empty() {
        let subject = Subject {
            id: 1,
            title: "Unreleased".to_string(),
            release_date: String::new(),
        };
        assert_eq!(subject.year(), "");
    }

    #[test]
    fn counts_iterate_in_presentation_order() {
        let counts = AggregatedCounts::new(12, 4, 4);
        let labels: Vec<&str> = counts.iter().map(|(c, _)| c.label()).collect();
        assert_eq!(labels, vec!["Women", "Men", "Unknown"]);
        assert_eq!(counts.total(), 20);
    }

    #[test]
    fn post_record_dates_serialize_as_plain_days() {
        let record = PostRecord {
            subject_id: 263115,
            date_posted: chrono::NaiveDate::from_ymd_opt(2017, 5, 12).unwrap(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"2017-05-12\""));
        let back: PostRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
