//! Language model infrastructure adapter.
//!
//! Implements the [`flowchart::TextGenerator`] trait for any provider that
//! speaks the OpenAI chat-completions protocol (`POST {base}/chat/completions`).
//! Other protocols are added as new `impl` blocks in this crate without any
//! changes to the `flowchart` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, and response parsing
//! live here. The [`flowchart`] crate sees only [`flowchart::TextGenerator`].
//! There is no retry or back-off: one upstream call per `generate`.

mod chat;
mod config;

pub use chat::ChatCompletionsClient;
pub use config::{LlmConfig, LlmConfigError};
