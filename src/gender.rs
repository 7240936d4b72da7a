//! Gender classification over the provider's raw cast codes.

use crate::models::{AggregatedCounts, CastMember, GenderCategory};

/// How many top-billed cast members a run considers.
pub const CAST_LIMIT: usize = 20;

/// Total mapping from the provider's untyped gender code. Exactly 1 means
/// women and exactly 2 means men; every other value, including an absent
/// one, is unknown.
pub fn classify(code: Option<i64>) -> GenderCategory {
    match code {
        Some(1) => GenderCategory::Women,
        Some(2) => GenderCategory::Men,
        _ => GenderCategory::Unknown,
    }
}

/// Tally categories across the first `limit` billed cast members.
/// Billing order is significant: entries past the limit are dropped, not
/// sampled. All three categories appear in the result, zeros included.
pub fn aggregate(cast: &[CastMember], limit: usize) -> AggregatedCounts {
    let mut women = 0;
    let mut men = 0;
    let mut unknown = 0;
    for member in cast.iter().take(limit) {
        match classify(member.gender_code) {
            GenderCategory::Women => women += 1,
            GenderCategory::Men => men += 1,
            GenderCategory::Unknown => unknown += 1,
        }
    }
    AggregatedCounts::new(women, men, unknown)
}
