//! Triggers: the daily release tick and the mention poll loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use chrono_tz::America::New_York;
use futures::future::join_all;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};

use crate::calendar::ReleaseCalendar;
use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::models::ReplyTarget;
use crate::pipeline::{self, RunOutcome, Trigger};
use crate::publisher::{Mention, PublisherClient};
use crate::tmdb::TmdbClient;

/// Shared collaborators for every run.
pub struct Services {
    pub tmdb: TmdbClient,
    pub publisher: PublisherClient,
    pub history: HistoryStore,
}

/// The bot's idea of "today": the current date in US Eastern time, where
/// the release calendar is written.
pub fn today_eastern() -> NaiveDate {
    chrono::Utc::now().with_timezone(&New_York).date_naive()
}

/// Build and start the daily release job. The returned handle must stay
/// alive for the lifetime of the process.
pub async fn build_scheduler(
    services: Arc<Services>,
    calendar: Arc<ReleaseCalendar>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow!("creating scheduler: {e}"))?;

    // 05:00 UTC sits at midnight or 1am Eastern depending on DST, right
    // after the release day turns over.
    let job = Job::new_async("0 0 5 * * *", move |_uuid, _lock| {
        let services = Arc::clone(&services);
        let calendar = Arc::clone(&calendar);
        Box::pin(async move {
            run_release_tick(&services, &calendar, today_eastern()).await;
        })
    })
    .map_err(|e| anyhow!("creating release job: {e}"))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| anyhow!("adding release job: {e}"))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow!("starting scheduler: {e}"))?;
    Ok(scheduler)
}

/// One daily tick: run the pipeline for every title releasing today.
/// Matching titles run concurrently; nothing serializes them.
pub async fn run_release_tick(services: &Services, calendar: &ReleaseCalendar, today: NaiveDate) {
    let titles = calendar.titles_releasing_on(today);
    if titles.is_empty() {
        debug!("No releases today - date={}", today);
        return;
    }
    info!("Release tick - date={}, matches={}", today, titles.len());

    let runs = titles.into_iter().map(|title| async move {
        let outcome = pipeline::run(
            &services.tmdb,
            &services.publisher,
            &services.history,
            title,
            today,
            Trigger::Schedule,
        )
        .await;
        (title, outcome)
    });

    for (title, outcome) in join_all(runs).await {
        match outcome {
            Ok(RunOutcome::Posted { status_id }) => {
                info!("Release posted - title={:?}, status_id={}", title, status_id)
            }
            Ok(RunOutcome::Skipped(reason)) => {
                info!("Release skipped - title={:?}, reason={:?}", title, reason)
            }
            Err(e) => error!("Release run failed - title={:?}, error={}", title, e),
        }
    }
}

/// Poll the mentions timeline and answer each new mention with a
/// breakdown, or with the lookup failure when there is no breakdown to
/// give. The first poll only establishes the high-water mark, so a
/// restart does not replay old mentions. Never returns.
pub async fn run_mention_loop(services: Arc<Services>, config: &AppConfig) {
    let mut since_id: Option<String> = None;
    let mut primed = false;
    let mut tick = tokio::time::interval(Duration::from_secs(config.mention_poll_secs));

    loop {
        tick.tick().await;

        let mentions = match services.publisher.mentions_since(since_id.as_deref()).await {
            Ok(mentions) => mentions,
            Err(e) => {
                warn!("Mention poll failed - error={}", e);
                continue;
            }
        };

        if let Some(newest) = mentions.first() {
            since_id = Some(newest.id_str.clone());
        }
        if !primed {
            primed = true;
            debug!("Mention mark established - since_id={:?}", since_id);
            continue;
        }

        // Oldest first, so replies land in arrival order.
        for mention in mentions.iter().rev() {
            handle_mention(&services, config, mention).await;
        }
    }
}

/// Answer one mention. The stripped text becomes the title query, even
/// when nothing remains: a bare mention earns the lookup-failure reply
/// instead of silence. The bot's own statuses are ignored.
pub async fn handle_mention(services: &Services, config: &AppConfig, mention: &Mention) {
    if mention
        .user
        .screen_name
        .eq_ignore_ascii_case(&config.bot_username)
    {
        return;
    }

    let query = strip_handles(&mention.text);
    info!(
        "Mention received - from={}, query={:?}",
        mention.user.screen_name, query
    );

    let target = ReplyTarget {
        status_id: mention.id_str.clone(),
        screen_name: mention.user.screen_name.clone(),
    };
    let outcome = pipeline::run(
        &services.tmdb,
        &services.publisher,
        &services.history,
        &query,
        today_eastern(),
        Trigger::Mention(target.clone()),
    )
    .await;

    match outcome {
        Ok(outcome) => debug!("Mention handled - id={}, outcome={:?}", mention.id_str, outcome),
        Err(e) if e.is_user_surfaced() => {
            info!("Mention run came up empty - id={}, reply={}", mention.id_str, e);
            if let Err(reply_err) = services.publisher.reply_error(&e.to_string(), &target).await {
                error!(
                    "Could not deliver the error reply - id={}, error={}",
                    mention.id_str, reply_err
                );
            }
        }
        Err(e) => error!("Mention run failed - id={}, error={}", mention.id_str, e),
    }
}

/// Drop `@handle` tokens from a mention; whatever remains is the title
/// query.
pub fn strip_handles(text: &str) -> String {
    text.split(' ')
        .filter(|token| !token.starts_with('@'))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_stripped_from_anywhere_in_the_text() {
        assert_eq!(strip_handles("@topbilled Space Jam"), "Space Jam");
        assert_eq!(strip_handles("Space Jam @topbilled"), "Space Jam");
        assert_eq!(
            strip_handles("@topbilled Harry Potter and the Goblet of Fire"),
            "Harry Potter and the Goblet of Fire"
        );
    }

    #[test]
    fn a_bare_mention_leaves_nothing() {
        assert_eq!(strip_handles("@topbilled"), "");
        assert_eq!(strip_handles("@topbilled @someone"), "");
    }

    #[test]
    fn inner_spacing_survives() {
        assert_eq!(strip_handles("@topbilled Space  Jam"), "Space  Jam");
    }
}
