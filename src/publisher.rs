//! Social platform client: media upload, alt text, status posting, and
//! mention polling.

use std::time::Duration;

use anyhow::Context;
use base64::Engine as _;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::BotError;
use crate::models::ReplyTarget;

const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1";
const DEFAULT_UPLOAD_BASE: &str = "https://upload.twitter.com/1.1";

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    id_str: String,
}

/// One status from the mentions timeline, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct Mention {
    pub id_str: String,
    pub text: String,
    pub user: MentionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentionUser {
    pub screen_name: String,
}

pub struct PublisherClient {
    client: Client,
    token: String,
    api_base: Url,
    upload_base: Url,
}

impl PublisherClient {
    pub fn new(token: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        Self::with_base_urls(token, timeout_secs, DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE)
    }

    /// Same as `new` but pointed at different hosts, for tests.
    pub fn with_base_urls(
        token: &str,
        timeout_secs: u64,
        api_base: &str,
        upload_base: &str,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building publisher HTTP client")?;
        let api_base = Url::parse(api_base)
            .with_context(|| format!("invalid publisher API base URL {api_base:?}"))?;
        let upload_base = Url::parse(upload_base)
            .with_context(|| format!("invalid publisher upload base URL {upload_base:?}"))?;
        Ok(Self {
            client,
            token: token.to_string(),
            api_base,
            upload_base,
        })
    }

    /// Upload a PNG and return the platform's media id for it.
    pub async fn upload_media(&self, png: &[u8]) -> Result<String, BotError> {
        let url = endpoint(&self.upload_base, "media/upload.json");
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        debug!("Uploading media - bytes={}", png.len());

        let response: MediaUploadResponse = self
            .send_json(
                self.client
                    .post(url)
                    .bearer_auth(&self.token)
                    .form(&[("media_data", encoded.as_str())]),
                "media upload",
            )
            .await?;
        Ok(response.media_id_string)
    }

    /// Attach alt text to an uploaded media item.
    pub async fn set_alt_text(&self, media_id: &str, text: &str) -> Result<(), BotError> {
        let url = endpoint(&self.api_base, "media/metadata/create.json");
        let body = serde_json::json!({
            "media_id": media_id,
            "alt_text": { "text": text },
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Publish(format!("media metadata: {e}")))?;
        response
            .error_for_status()
            .map_err(|e| BotError::Publish(format!("media metadata: {e}")))?;
        Ok(())
    }

    /// Post a status, optionally with media attached. For replies the text
    /// is prefixed with the author's handle and threaded onto their status.
    pub async fn post_status(
        &self,
        text: &str,
        media_id: Option<&str>,
        reply: Option<&ReplyTarget>,
    ) -> Result<String, BotError> {
        let url = endpoint(&self.api_base, "statuses/update.json");
        let status = match reply {
            Some(target) => format!("@{} {}", target.screen_name, text),
            None => text.to_string(),
        };

        let mut form: Vec<(&str, String)> = vec![("status", status)];
        if let Some(id) = media_id {
            form.push(("media_ids", id.to_string()));
        }
        if let Some(target) = reply {
            form.push(("in_reply_to_status_id", target.status_id.clone()));
        }

        let response: StatusResponse = self
            .send_json(
                self.client.post(url).bearer_auth(&self.token).form(&form),
                "status update",
            )
            .await?;
        info!(
            "Status posted - id={}, reply={}",
            response.id_str,
            reply.is_some()
        );
        Ok(response.id_str)
    }

    /// Reply to a mention with a plain text message and no media.
    pub async fn reply_error(&self, message: &str, reply: &ReplyTarget) -> Result<(), BotError> {
        self.post_status(message, None, Some(reply)).await.map(|_| ())
    }

    /// Mentions newer than `since_id`, newest first. Without a mark the
    /// platform returns its most recent page.
    pub async fn mentions_since(&self, since_id: Option<&str>) -> Result<Vec<Mention>, BotError> {
        let mut url = endpoint(&self.api_base, "statuses/mentions_timeline.json");
        if let Some(id) = since_id {
            url.query_pairs_mut().append_pair("since_id", id);
        }

        self.send_json(
            self.client.get(url).bearer_auth(&self.token),
            "mentions timeline",
        )
        .await
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, BotError> {
        let response = request
            .send()
            .await
            .map_err(|e| BotError::Publish(format!("{what}: {e}")))?;
        let response = response
            .error_for_status()
            .map_err(|e| BotError::Publish(format!("{what}: {e}")))?;
        response
            .json::<T>()
            .await
            .map_err(|e| BotError::Publish(format!("{what}: {e}")))
    }
}

fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url
}
