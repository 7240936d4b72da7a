//! Wire-format types for the metadata provider, kept apart from the
//! domain models.

use serde::Deserialize;

/// Envelope for `GET /search/movie`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    /// `YYYY-MM-DD`; the provider omits it for unscheduled titles.
    #[serde(default)]
    pub release_date: String,
}

/// Envelope for `GET /movie/{id}?append_to_response=credits`. Only the
/// credits block matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieWithCredits {
    pub credits: Credits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastEntry>,
}

/// One billed cast entry. The gender field is untyped at this boundary:
/// the provider has sent 1, 2, 0, 3, null, and occasionally strings.
/// Anything that is not an integer decodes to `None` so one odd entry
/// cannot sink the whole cast list.
#[derive(Debug, Clone, Deserialize)]
pub struct CastEntry {
    pub name: String,
    #[serde(default, deserialize_with = "gender_code")]
    pub gender: Option<i64>,
}

fn gender_code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_results_decode_with_missing_release_date() {
        let body = r#"{"results": [{"id": 2300, "title": "Space Jam"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results[0].id, 2300);
        assert_eq!(parsed.results[0].release_date, "");
    }

    #[test]
    fn cast_entries_decode_null_and_absent_gender() {
        let body = r#"{
            "credits": {"cast": [
                {"name": "A", "gender": 1},
                {"name": "B", "gender": null},
                {"name": "C"},
                {"name": "D", "gender": 3}
            ]}
        }"#;
        let parsed: MovieWithCredits = serde_json::from_str(body).unwrap();
        let genders: Vec<Option<i64>> =
            parsed.credits.cast.iter().map(|c| c.gender).collect();
        assert_eq!(genders, vec![Some(1), None, None, Some(3)]);
    }

    #[test]
    fn non_integer_genders_decode_untyped() {
        let body = r#"{
            "credits": {"cast": [
                {"name": "E", "gender": "1"},
                {"name": "F", "gender": 2.5},
                {"name": "G", "gender": {"code": 2}},
                {"name": "H", "gender": 2}
            ]}
        }"#;
        let parsed: MovieWithCredits = serde_json::from_str(body).unwrap();
        let genders: Vec<Option<i64>> =
            parsed.credits.cast.iter().map(|c| c.gender).collect();
        assert_eq!(genders, vec![None, None, None, Some(2)]);
    }

    #[test]
    fn empty_search_body_decodes_to_no_results() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
