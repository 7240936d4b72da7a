//! Metadata provider client.

use std::time::{Duration, Instant};

use anyhow::Context;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::api_types::{MovieWithCredits, SearchResponse};
use crate::error::BotError;
use crate::gender::CAST_LIMIT;
use crate::models::{CastMember, Subject};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl TmdbClient {
    pub fn new(api_key: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Same as `new` but pointed at a different host, for tests.
    pub fn with_base_url(api_key: &str, timeout_secs: u64, base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building metadata HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid metadata base URL {base_url:?}"))?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url,
        })
    }

    /// Look up a title and keep the provider's first hit. Anything that
    /// prevents that, from a transport failure to an empty result list,
    /// surfaces as the subject not being found.
    pub async fn search(&self, query: &str) -> Result<Subject, BotError> {
        let start = Instant::now();
        let url = self.build_url("search/movie", &[("query", query)]);
        debug!("Searching for subject - query={:?}", query);

        let response: SearchResponse = self.get_json(url).await.map_err(|e| {
            warn!("Subject search failed - query={:?}, error={:#}", query, e);
            BotError::SubjectNotFound {
                query: query.to_string(),
            }
        })?;

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| BotError::SubjectNotFound {
                query: query.to_string(),
            })?;

        info!(
            "Subject found - id={}, title={:?}, duration={:.2}s",
            first.id,
            first.title,
            start.elapsed().as_secs_f32()
        );

        Ok(Subject {
            id: first.id,
            title: first.title,
            release_date: first.release_date,
        })
    }

    /// Fetch the billed cast for a subject, in billing order. The provider
    /// must list more than `CAST_LIMIT` entries; thinner casts are reported
    /// as insufficient data.
    pub async fn credits(&self, subject_id: u64) -> Result<Vec<CastMember>, BotError> {
        let start = Instant::now();
        let url = self.build_url(
            &format!("movie/{subject_id}"),
            &[("append_to_response", "credits")],
        );

        let movie: MovieWithCredits = self.get_json(url).await.map_err(|e| {
            warn!("Credits fetch failed - id={}, error={:#}", subject_id, e);
            BotError::InsufficientCastData { found: 0 }
        })?;

        let cast = movie.credits.cast;
        if cast.len() < CAST_LIMIT + 1 {
            return Err(BotError::InsufficientCastData { found: cast.len() });
        }

        info!(
            "Credits fetched - id={}, cast={}, duration={:.2}s",
            subject_id,
            cast.len(),
            start.elapsed().as_secs_f32()
        );

        Ok(cast
            .into_iter()
            .map(|entry| CastMember {
                name: entry.name,
                gender_code: entry.gender,
            })
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> anyhow::Result<T> {
        let path = url.path().to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request failed for {path}"))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("HTTP error for {path}"))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("decoding response for {path}"))
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}
