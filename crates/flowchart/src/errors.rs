//! Error types for the flowchart domain.
//!
//! The `Display` text of [`ValidationError`], [`ExtractionError`], and
//! [`GenerationError::Empty`] is shown to end users verbatim (as the HTTP
//! `detail` field), so those messages are written for users rather than
//! operators.
//!
//! ## Error classes
//!
//! - **Client-caused**: everything in [`ValidationError`] and
//!   [`ExtractionError`], plus [`GenerationError::Empty`]. The request or the
//!   model output was unusable; retrying the same input may help.
//! - **Internal**: [`GenerationError::Unavailable`]. The upstream model could
//!   not be reached or answered with an error.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Structural violations found in a decoded graph description.
///
/// Produced by [`crate::validate_graph_value`]. Only key presence is checked;
/// there is no cycle, duplicate-id, or dangling-edge detection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The top-level value is not an object, or lacks `nodes` or `edges`.
    #[error("JSON должен содержать ключи 'nodes' и 'edges'.")]
    MissingTopLevelKeys,

    /// `nodes` or `edges` is present but is not an array.
    #[error("Ключ '{key}' должен быть массивом.")]
    NotAnArray {
        /// The offending top-level key.
        key: &'static str,
    },

    /// A node entry lacks `id`, `label`, or `shape`.
    #[error("Каждый узел должен содержать 'id', 'label' и 'shape'.")]
    NodeMissingField {
        /// Zero-based position of the offending node.
        index: usize,
    },

    /// An edge entry lacks `from` or `to`.
    #[error("Каждое ребро должно содержать 'from' и 'to'.")]
    EdgeMissingField {
        /// Zero-based position of the offending edge.
        index: usize,
    },
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Failure to recover a JSON object from free-form model output.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No balanced `{...}` fragment exists in the text.
    #[error("Ответ модели не является валидным JSON.")]
    NoObject,

    /// Balanced fragments exist but none of them parses as a JSON object.
    #[error("Ответ модели не является валидным JSON.")]
    Invalid {
        /// Parse error of the first candidate fragment.
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Failure returned by a [`crate::TextGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The prompt was empty or the model returned no text.
    #[error("Ошибка обработки запроса.")]
    Empty,

    /// The model could not be reached, or responded with an error.
    #[error("text generation unavailable: {message}")]
    Unavailable {
        /// Description of the transport or upstream failure.
        message: String,
    },
}
