//! Release calendar: titles keyed to the day they open.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Calendar of upcoming releases, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ReleaseCalendar {
    entries: Vec<(String, NaiveDate)>,
}

impl ReleaseCalendar {
    /// Load a `{"Title": "YYYY-MM-DD"}` JSON file. Entries whose date does
    /// not parse are skipped with a warning rather than failing the load.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading release calendar {}", path.display()))?;
        let raw: BTreeMap<String, String> = serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding release calendar {}", path.display()))?;

        let mut entries = Vec::with_capacity(raw.len());
        for (title, date) in raw {
            match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
                Ok(parsed) => entries.push((title, parsed)),
                Err(e) => warn!(
                    "Skipping calendar entry with a bad date - title={:?}, date={:?}, error={}",
                    title, date, e
                ),
            }
        }
        info!("Release calendar loaded - entries={}", entries.len());
        Ok(Self { entries })
    }

    /// Titles whose release date is exactly `date`.
    pub fn titles_releasing_on(&self, date: NaiveDate) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, release)| *release == date)
            .map(|(title, _)| title.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_calendar(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn matches_titles_on_their_release_day() {
        let file = write_calendar(
            r#"{
                "Marshall": "2017-10-13",
                "Professor Marston and the Wonder Women": "2017-10-13",
                "The Snowman": "2017-10-20"
            }"#,
        );
        let calendar = ReleaseCalendar::load(file.path()).unwrap();
        assert_eq!(calendar.len(), 3);

        let day = NaiveDate::from_ymd_opt(2017, 10, 13).unwrap();
        let titles = calendar.titles_releasing_on(day);
        assert_eq!(
            titles,
            vec!["Marshall", "Professor Marston and the Wonder Women"]
        );

        let quiet_day = NaiveDate::from_ymd_opt(2017, 10, 14).unwrap();
        assert!(calendar.titles_releasing_on(quiet_day).is_empty());
    }

    #[test]
    fn bad_dates_are_skipped_not_fatal() {
        let file = write_calendar(r#"{"Marshall": "2017-10-13", "Broken": "October 13"}"#);
        let calendar = ReleaseCalendar::load(file.path()).unwrap();
        assert_eq!(calendar.len(), 1);
    }

    #[test]
    fn a_missing_file_is_an_error() {
        assert!(ReleaseCalendar::load(Path::new("no-such-releases.json")).is_err());
    }
}
