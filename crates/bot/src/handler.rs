//! The `/block` request flow.
//!
//! ```text
//! Idle ─▶ RateCheck ─▶ Processing ─▶ Delivery ─▶ Cleanup ─▶ Idle
//!            │  └─ no algorithm ─▶ usage hint ─▶ Idle
//!            └─ inside cooldown ─▶ "too frequent" ─▶ Idle
//! ```
//!
//! Attempts are best-effort: a failed attempt is logged with its reason and
//! the remaining attempts still run. Cleanup removes every downloaded file
//! whether or not delivery succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flowchart::{AttemptIndex, TempFileName};

use crate::messages::{self, GENERATION_FAILED, IN_PROGRESS, TOO_FREQUENT, USAGE};
use crate::{
    parse_block_command, DiagramSource, IncomingMessage, Messenger, MessengerError, Photo,
    RateLimiter,
};

/// Number of independent generation attempts per command.
pub const ATTEMPTS: u8 = 3;

/// Result of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    /// Which attempt this was.
    pub attempt: AttemptIndex,
    /// Downloaded image on success, failure reason otherwise.
    pub outcome: Result<PathBuf, String>,
}

impl AttemptReport {
    /// The downloaded file, if the attempt succeeded.
    pub fn path(&self) -> Option<&Path> {
        self.outcome.as_deref().ok()
    }
}

/// What the handler did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The message is not a `/block` command.
    Ignored,
    /// The user is inside the cooldown window; nothing was generated.
    RateLimited,
    /// `/block` without an algorithm; the usage hint was sent.
    MissingAlgorithm,
    /// All attempts ran and the results (if any) were delivered.
    Completed {
        /// Per-attempt outcomes, in attempt order.
        attempts: Vec<AttemptReport>,
        /// Number of images sent to the user.
        delivered: usize,
    },
    /// Processing or delivery failed; the failure notice was sent.
    Failed {
        /// Per-attempt outcomes gathered before the failure.
        attempts: Vec<AttemptReport>,
    },
}

/// Handles `/block` commands.
///
/// Owns the rate-limit state; share one handler (behind an [`Arc`]) across
/// all concurrently dispatched commands.
pub struct BlockCommandHandler {
    messenger: Arc<dyn Messenger>,
    diagrams: Arc<dyn DiagramSource>,
    rate_limiter: RateLimiter,
    temp_dir: PathBuf,
}

impl BlockCommandHandler {
    /// Creates a handler that downloads images into `temp_dir`.
    pub fn new(
        messenger: Arc<dyn Messenger>,
        diagrams: Arc<dyn DiagramSource>,
        rate_limiter: RateLimiter,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            messenger,
            diagrams,
            rate_limiter,
            temp_dir: temp_dir.into(),
        }
    }

    /// Runs the full request flow for `message`.
    #[tracing::instrument(
        skip_all,
        fields(user = %message.user_id, chat = %message.chat_id, message_id = %message.message_id)
    )]
    pub async fn handle(&self, message: &IncomingMessage) -> CommandOutcome {
        let Some(algorithm) = parse_block_command(&message.text) else {
            return CommandOutcome::Ignored;
        };

        if let Err(remaining) = self.rate_limiter.try_acquire(message.user_id) {
            tracing::info!(remaining_ms = remaining.as_millis() as u64, "request rejected by cooldown");
            self.reply_best_effort(message, TOO_FREQUENT).await;
            return CommandOutcome::RateLimited;
        }

        let Some(algorithm) = algorithm else {
            self.reply_best_effort(message, USAGE).await;
            return CommandOutcome::MissingAlgorithm;
        };

        let mut attempts = Vec::with_capacity(ATTEMPTS as usize);
        let result = self.process(message, algorithm, &mut attempts).await;

        if let Err(e) = &result {
            tracing::error!(error = %e, "flowchart delivery failed");
            self.reply_best_effort(message, GENERATION_FAILED).await;
        }

        remove_files(attempts.iter().filter_map(AttemptReport::path)).await;
        self.rate_limiter.touch(message.user_id);

        match result {
            Ok(delivered) => CommandOutcome::Completed {
                attempts,
                delivered,
            },
            Err(_) => CommandOutcome::Failed { attempts },
        }
    }

    /// Acknowledges, runs the attempts, and delivers. Returns the number of
    /// images sent.
    async fn process(
        &self,
        message: &IncomingMessage,
        algorithm: &str,
        attempts: &mut Vec<AttemptReport>,
    ) -> Result<usize, MessengerError> {
        let progress = self.messenger.reply(message, IN_PROGRESS).await?;

        for attempt in AttemptIndex::sequence(ATTEMPTS) {
            attempts.push(self.run_attempt(algorithm, attempt).await);
        }

        let succeeded = attempts.iter().filter(|a| a.outcome.is_ok()).count();
        tracing::info!(succeeded, total = ATTEMPTS, "generation attempts finished");

        let mut photos = Vec::with_capacity(succeeded);
        for report in attempts.iter() {
            let Some(path) = report.path() else { continue };
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                photos.push(Photo {
                    path: path.to_path_buf(),
                    caption: messages::caption(report.attempt),
                });
            }
        }

        if !photos.is_empty() {
            self.messenger.reply_photos(message, &photos).await?;
        }
        self.messenger.delete(&progress).await?;

        Ok(photos.len())
    }

    /// Fetches one image and stores it under a unique name. Never fails: the
    /// failure reason is recorded in the report.
    async fn run_attempt(&self, algorithm: &str, attempt: AttemptIndex) -> AttemptReport {
        tracing::info!(attempt = attempt.get(), "generation attempt started");

        let outcome = match self.diagrams.fetch(algorithm, attempt).await {
            Ok(bytes) => {
                let path = self.temp_dir.join(TempFileName::new_random().to_string());
                match tokio::fs::write(&path, &bytes).await {
                    Ok(()) => Ok(path),
                    Err(e) => Err(format!("failed to store '{}': {e}", path.display())),
                }
            }
            Err(e) => Err(e.to_string()),
        };

        match &outcome {
            Ok(path) => tracing::info!(
                attempt = attempt.get(),
                outcome = "success",
                path = %path.display(),
                "generation attempt finished"
            ),
            Err(reason) => tracing::warn!(
                attempt = attempt.get(),
                outcome = "failure",
                reason = %reason,
                "generation attempt finished"
            ),
        }

        AttemptReport { attempt, outcome }
    }

    async fn reply_best_effort(&self, message: &IncomingMessage, text: &str) {
        if let Err(e) = self.messenger.reply(message, text).await {
            tracing::warn!(error = %e, "failed to send reply");
        }
    }
}

async fn remove_files<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary file"),
        }
    }
}
