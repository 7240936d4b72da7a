//! One pipeline run: title query to published status.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::chart;
use crate::compose;
use crate::error::BotError;
use crate::gender::{self, CAST_LIMIT};
use crate::history::{self, HistoryStore};
use crate::models::{PostRecord, PublishRequest, ReplyTarget};
use crate::publisher::PublisherClient;
use crate::tmdb::TmdbClient;

/// What started a run.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// The daily release tick or a one-shot command.
    Schedule,
    /// A user mention. Lookup failures are surfaced back as a reply, and
    /// the breakdown goes to the mentioning user as well as the timeline.
    Mention(ReplyTarget),
}

/// Terminal state of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Published to the main timeline.
    Posted { status_id: String },
    /// Dedupe turned the run away; informational, not a failure.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyPosted,
}

/// Run the whole pipeline for one title query.
///
/// Stages: subject lookup, credits fetch, tally, chart render, then the
/// deduplicated main-timeline publish. Mention-triggered runs add a reply
/// leg that never touches dedupe or the history file.
pub async fn run(
    tmdb: &TmdbClient,
    publisher: &PublisherClient,
    history: &HistoryStore,
    query: &str,
    today: NaiveDate,
    trigger: Trigger,
) -> Result<RunOutcome, BotError> {
    let start = Instant::now();
    info!("Run started - query={:?}, trigger={:?}", query, trigger);

    let subject = tmdb.search(query).await?;
    let year = subject.year().to_string();

    let cast = tmdb.credits(subject.id).await?;
    let counts = gender::aggregate(&cast, CAST_LIMIT);
    debug!("Tally complete - id={}, counts={:?}", subject.id, counts);

    let image_png = chart::render_chart(&counts, &subject.title, &year, CAST_LIMIT)
        .map_err(|e| BotError::Render(format!("{e:#}")))?;

    let request = PublishRequest {
        subject_id: subject.id,
        title: subject.title,
        year,
        cast_member_count: CAST_LIMIT,
        counts,
        image_png,
        reply: None,
    };

    let outcome = match &trigger {
        Trigger::Schedule => publish_to_timeline(publisher, history, &request, today).await?,
        Trigger::Mention(target) => {
            // Timeline leg first, deduplicated as usual. A failure here
            // still lets the reply leg go out.
            let timeline = publish_to_timeline(publisher, history, &request, today).await;
            if let Err(e) = &timeline {
                warn!(
                    "Timeline leg failed on a mention run - id={}, error={}",
                    request.subject_id, e
                );
            }

            // The reply leg always posts: no dedupe, no history record.
            let mut reply_request = request.clone();
            reply_request.reply = Some(target.clone());
            publish(publisher, &reply_request).await?;

            timeline?
        }
    };

    info!(
        "Run finished - query={:?}, outcome={:?}, duration={:.2}s",
        query,
        outcome,
        start.elapsed().as_secs_f32()
    );
    Ok(outcome)
}

/// The deduplicated main-timeline leg: check, publish, record, all under
/// the subject's guard so same-subject runs serialize.
async fn publish_to_timeline(
    publisher: &PublisherClient,
    history: &HistoryStore,
    request: &PublishRequest,
    today: NaiveDate,
) -> Result<RunOutcome, BotError> {
    let _guard = history.subject_guard(request.subject_id).await;

    let records = history.load()?;
    if !history::should_post(&records, request.subject_id, today) {
        info!("{} has already been posted to the main timeline.", request.title);
        return Ok(RunOutcome::Skipped(SkipReason::AlreadyPosted));
    }
    if records.iter().any(|r| r.subject_id == request.subject_id) {
        info!("The subject had already been posted, but it has been a while.");
    }

    let status_id = publish(publisher, request).await?;

    // Recording happens after the status is out; a failed write is logged
    // and the run still counts as posted.
    let record = PostRecord {
        subject_id: request.subject_id,
        date_posted: today,
    };
    if let Err(e) = history.append(record).await {
        warn!(
            "Could not record the posted subject - id={}, error={}",
            request.subject_id, e
        );
    }

    Ok(RunOutcome::Posted { status_id })
}

/// One publish leg: upload the chart, attach alt text, post the status.
/// A failure at any sub-step abandons the rest of the leg.
async fn publish(
    publisher: &PublisherClient,
    request: &PublishRequest,
) -> Result<String, BotError> {
    let media_id = publisher.upload_media(&request.image_png).await?;

    let alt_text = compose::compose_alt_text(&request.counts);
    debug!("Alt text - {}", alt_text);
    publisher.set_alt_text(&media_id, &alt_text).await?;

    let text = compose::compose_tweet_text(
        request.cast_member_count,
        &request.title,
        &request.year,
        &request.counts,
        request.subject_id,
    );
    debug!("Status text - {}", text);

    publisher
        .post_status(&text, Some(&media_id), request.reply.as_ref())
        .await
}
