//! Core domain for the flowchart pipeline.
//!
//! This crate contains the graph description model, newtype identifiers,
//! validation and extraction of model output, the instructional prompt, and the
//! [`TextGenerator`] port. Infrastructure crates (`llm`, `renderer`, `engine`,
//! `bot`) implement or consume what is defined here; they never add domain
//! rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`NodeId`, `UserId`, `ChatId`, `MessageId`, `AttemptIndex`) |
//! | [`types`] | Graph description model and shared value types (`Timestamp`) |
//! | [`validate`] | Structural validation of decoded model output |
//! | [`extract`] | Bracket-depth extraction of a JSON object from free text |
//! | [`prompt`] | The fixed instructional prompt sent to the language model |
//! | [`generator`] | The [`TextGenerator`] port |
//! | [`errors`] | Validation, extraction, and generation error types |

pub mod errors;
pub mod extract;
pub mod generator;
pub mod identifiers;
pub mod prompt;
pub mod types;
pub mod validate;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ExtractionError, GenerationError, ValidationError};
pub use extract::extract_json_object;
pub use generator::TextGenerator;
pub use identifiers::{AttemptIndex, ChatId, EmptyIdError, MessageId, NodeId, TempFileName, UserId};
pub use prompt::build_prompt;
pub use types::{EdgeSpec, GraphDescription, NodeSpec, Timestamp};
pub use validate::validate_graph_value;
