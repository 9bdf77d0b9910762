//! Bot settings, loaded once at startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::rate_limit::DEFAULT_COOLDOWN;

/// Default Bot API base URL.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Errors produced while loading [`BotConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotConfigError {
    /// A required variable is unset or empty.
    #[error("{name} must be set")]
    Missing {
        /// Variable name.
        name: &'static str,
    },

    /// A URL variable is not an absolute `http(s)` URL.
    #[error("{name} must start with http:// or https://, got '{value}'")]
    InvalidUrl {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// `BOT_COOLDOWN_SECS` is not a whole number of seconds.
    #[error("BOT_COOLDOWN_SECS must be a whole number of seconds, got '{value}'")]
    InvalidCooldown {
        /// The rejected value.
        value: String,
    },
}

/// Everything the bot process needs to start.
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Bot API token.
    pub telegram_token: String,
    /// Bot API base URL.
    pub telegram_api_base: String,
    /// Full URL of the diagram generation endpoint.
    pub diagram_url: String,
    /// Directory for downloaded images.
    pub temp_dir: PathBuf,
    /// Minimum interval between two accepted requests of one user.
    pub cooldown: Duration,
}

// The token is a credential; keep it out of logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &"<redacted>")
            .field("telegram_api_base", &self.telegram_api_base)
            .field("diagram_url", &self.diagram_url)
            .field("temp_dir", &self.temp_dir)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

impl BotConfig {
    /// Loads settings from `TELEGRAM_API_TOKEN` and `API_URL` (required),
    /// `TELEGRAM_API_BASE`, `BOT_TEMP_DIR` (default: the system temp dir), and
    /// `BOT_COOLDOWN_SECS` (default 5).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BotConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(BotConfigError::Missing { name })
        };

        let telegram_token = required("TELEGRAM_API_TOKEN")?;
        let diagram_url = checked_url("API_URL", required("API_URL")?)?;
        let telegram_api_base = checked_url(
            "TELEGRAM_API_BASE",
            lookup("TELEGRAM_API_BASE").unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
        )?;

        let cooldown = match lookup("BOT_COOLDOWN_SECS") {
            None => DEFAULT_COOLDOWN,
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| BotConfigError::InvalidCooldown { value })?,
        };

        Ok(Self {
            telegram_token,
            telegram_api_base,
            diagram_url,
            temp_dir: lookup("BOT_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            cooldown,
        })
    }
}

fn checked_url(name: &'static str, value: String) -> Result<String, BotConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(BotConfigError::InvalidUrl { name, value })
    }
}
