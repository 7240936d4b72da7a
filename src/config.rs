//! Process configuration, read once at startup.

use std::fmt;
use std::path::PathBuf;

/// Runtime configuration. Secrets are redacted from Debug output so the
/// startup log can print the whole thing.
#[derive(Clone)]
pub struct AppConfig {
    pub tmdb_api_key: String,
    pub publisher_token: String,
    /// The bot's own handle, without the leading `@`. Mentions from this
    /// account are ignored.
    pub bot_username: String,
    pub history_path: PathBuf,
    pub releases_path: PathBuf,
    pub mention_poll_secs: u64,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Build from environment variables. Every missing required variable
    /// is reported in one error.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let tmdb_api_key = lookup("TMDB_API_KEY");
        let publisher_token = lookup("PUBLISHER_BEARER_TOKEN");
        let bot_username = lookup("BOT_USERNAME");

        let mut missing = Vec::new();
        if tmdb_api_key.is_none() {
            missing.push("TMDB_API_KEY");
        }
        if publisher_token.is_none() {
            missing.push("PUBLISHER_BEARER_TOKEN");
        }
        if bot_username.is_none() {
            missing.push("BOT_USERNAME");
        }
        if !missing.is_empty() {
            return Err(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        Ok(Self {
            tmdb_api_key: tmdb_api_key.unwrap_or_default(),
            publisher_token: publisher_token.unwrap_or_default(),
            bot_username: bot_username
                .unwrap_or_default()
                .trim_start_matches('@')
                .to_string(),
            history_path: lookup("HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("posted.json")),
            releases_path: lookup("RELEASES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("releases.json")),
            mention_poll_secs: parse_secs(&lookup, "MENTION_POLL_SECS", 15)?,
            request_timeout_secs: parse_secs(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
        })
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, String> {
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| format!("{key} is not a number of seconds: {value:?}")),
        None => Ok(default),
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("tmdb_api_key", &"[redacted]")
            .field("publisher_token", &"[redacted]")
            .field("bot_username", &self.bot_username)
            .field("history_path", &self.history_path)
            .field("releases_path", &self.releases_path)
            .field("mention_poll_secs", &self.mention_poll_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn build(pairs: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars = env(pairs);
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_environment_fills_defaults() {
        let config = build(&[
            ("TMDB_API_KEY", "tmdb"),
            ("PUBLISHER_BEARER_TOKEN", "bearer"),
            ("BOT_USERNAME", "topbilled"),
        ])
        .unwrap();

        assert_eq!(config.history_path, PathBuf::from("posted.json"));
        assert_eq!(config.releases_path, PathBuf::from("releases.json"));
        assert_eq!(config.mention_poll_secs, 15);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn every_missing_variable_is_reported_at_once() {
        let err = build(&[("BOT_USERNAME", "topbilled")]).unwrap_err();
        assert!(err.contains("TMDB_API_KEY"));
        assert!(err.contains("PUBLISHER_BEARER_TOKEN"));
        assert!(!err.contains("BOT_USERNAME"));
    }

    #[test]
    fn the_leading_at_is_stripped_from_the_handle() {
        let config = build(&[
            ("TMDB_API_KEY", "tmdb"),
            ("PUBLISHER_BEARER_TOKEN", "bearer"),
            ("BOT_USERNAME", "@topbilled"),
        ])
        .unwrap();
        assert_eq!(config.bot_username, "topbilled");
    }

    #[test]
    fn a_garbled_poll_interval_is_rejected() {
        let err = build(&[
            ("TMDB_API_KEY", "tmdb"),
            ("PUBLISHER_BEARER_TOKEN", "bearer"),
            ("BOT_USERNAME", "topbilled"),
            ("MENTION_POLL_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(err.contains("MENTION_POLL_SECS"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = build(&[
            ("TMDB_API_KEY", "tmdb-secret"),
            ("PUBLISHER_BEARER_TOKEN", "bearer-secret"),
            ("BOT_USERNAME", "topbilled"),
        ])
        .unwrap();

        let printed = format!("{config:?}");
        assert!(printed.contains("[redacted]"));
        assert!(!printed.contains("tmdb-secret"));
        assert!(!printed.contains("bearer-secret"));
    }
}
