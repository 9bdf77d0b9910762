//! Chat-bot front end for the flowchart service.
//!
//! Handles the `/block <algorithm>` command: enforces a per-user cooldown,
//! asks the diagram service for three independent variants, replies with the
//! images that were produced, and always removes the downloaded files.
//!
//! ## Architectural Layer
//!
//! **Orchestration + infrastructure.** [`BlockCommandHandler`] sequences calls
//! through two seams, [`Messenger`] (the chat platform) and [`DiagramSource`]
//! (the diagram service). [`TelegramClient`] and [`HttpDiagramClient`] are the
//! production implementations; [`run_polling`] feeds updates into the handler.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`command`] | `/block` parsing |
//! | [`rate_limit`] | Per-user cooldown map |
//! | [`handler`] | The request flow: rate check, three attempts, delivery, cleanup |
//! | [`ports`] | `Messenger` / `DiagramSource` traits and message types |
//! | [`telegram`] | Telegram Bot API adapter and update polling |
//! | [`diagram_client`] | HTTP client for the diagram service |
//! | [`config`] | Environment configuration |

pub mod command;
pub mod config;
pub mod diagram_client;
pub mod error;
pub mod handler;
pub mod messages;
pub mod ports;
pub mod rate_limit;
pub mod telegram;

pub use command::parse_block_command;
pub use config::{BotConfig, BotConfigError};
pub use diagram_client::HttpDiagramClient;
pub use error::{DiagramFetchError, MessengerError};
pub use handler::{AttemptReport, BlockCommandHandler, CommandOutcome, ATTEMPTS};
pub use ports::{DiagramSource, IncomingMessage, Messenger, Photo, SentMessage};
pub use rate_limit::RateLimiter;
pub use telegram::{run_polling, TelegramClient};
