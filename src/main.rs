use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use topbilled::calendar::ReleaseCalendar;
use topbilled::config::AppConfig;
use topbilled::history::HistoryStore;
use topbilled::pipeline::{self, RunOutcome, Trigger};
use topbilled::publisher::PublisherClient;
use topbilled::scheduler::{self, Services};
use topbilled::tmdb::TmdbClient;

/// Posts the gender breakdown of a film's top-billed cast on release day.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bot: daily release schedule plus mention replies.
    Run,
    /// Post the breakdown for a single title, then exit.
    Post {
        /// Title to look up.
        #[arg(short, long)]
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_line_number(true)
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().map_err(|e| anyhow!(e))?;
    info!("Starting up - config={:?}", config);

    let services = Arc::new(Services {
        tmdb: TmdbClient::new(&config.tmdb_api_key, config.request_timeout_secs)?,
        publisher: PublisherClient::new(&config.publisher_token, config.request_timeout_secs)?,
        history: HistoryStore::new(config.history_path.clone()),
    });

    match args.command.unwrap_or(Command::Run) {
        Command::Post { title } => {
            let outcome = pipeline::run(
                &services.tmdb,
                &services.publisher,
                &services.history,
                &title,
                scheduler::today_eastern(),
                Trigger::Schedule,
            )
            .await
            .with_context(|| format!("posting breakdown for {title:?}"))?;
            match outcome {
                RunOutcome::Posted { status_id } => info!("Posted - status_id={}", status_id),
                RunOutcome::Skipped(reason) => info!("Skipped - reason={:?}", reason),
            }
        }
        Command::Run => {
            let calendar = Arc::new(ReleaseCalendar::load(&config.releases_path)?);
            let _scheduler =
                scheduler::build_scheduler(Arc::clone(&services), Arc::clone(&calendar)).await?;
            info!(
                "Scheduler running - releases={}, mention_poll={}s",
                calendar.len(),
                config.mention_poll_secs
            );
            scheduler::run_mention_loop(services, &config).await;
        }
    }

    Ok(())
}
