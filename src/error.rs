use thiserror::Error;

/// Failure taxonomy for a single pipeline run. Every variant ends the run
/// that raised it; nothing is retried.
#[derive(Debug, Error)]
pub enum BotError {
    /// The title lookup produced nothing. The display text doubles as the
    /// reply sent back to a mentioning user.
    #[error("I could not find film information for \"{query}\".")]
    SubjectNotFound { query: String },

    /// The provider listed fewer billed cast members than the bot needs.
    /// The display text doubles as the mention reply.
    #[error("I could not gather enough information on the cast members of this film.")]
    InsufficientCastData { found: usize },

    #[error("could not render the breakdown chart: {0}")]
    Render(String),

    #[error("the publishing platform rejected the request: {0}")]
    Publish(String),

    #[error("could not read the post history: {0}")]
    HistoryRead(String),

    #[error("could not write the post history: {0}")]
    HistoryWrite(String),
}

impl BotError {
    /// Whether a mention-triggered run should surface this failure to the
    /// mentioning user as a reply. Everything else stays in the logs.
    pub fn is_user_surfaced(&self) -> bool {
        matches!(
            self,
            BotError::SubjectNotFound { .. } | BotError::InsufficientCastData { .. }
        )
    }
}
