//! Graph description model and shared value types.
//!
//! A [`GraphDescription`] is decoded from language-model output once per
//! generation request and consumed immediately by the renderer. Nothing here
//! is persisted.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::NodeId;

// ---------------------------------------------------------------------------
// Graph description
// ---------------------------------------------------------------------------

/// A flowchart as produced by the language model: ordered nodes and edges.
///
/// Deserialise only after [`crate::validate_graph_value`] has accepted the raw
/// value; the validator produces the user-facing messages for missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Flowchart blocks, in declaration order.
    pub nodes: Vec<NodeSpec>,
    /// Connections between blocks, in declaration order.
    pub edges: Vec<EdgeSpec>,
}

impl GraphDescription {
    /// Decodes a graph description from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

// ---------------------------------------------------------------------------

/// A single flowchart block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Identifier unique within the enclosing [`GraphDescription`].
    pub id: NodeId,

    /// Text drawn inside the block.
    pub label: String,

    /// Graphviz shape name (e.g. `"box"`, `"ellipse"`, `"diamond"`,
    /// `"parallelogram"`).
    ///
    /// Kept as a string: the model may emit any shape Graphviz understands.
    pub shape: String,
}

// ---------------------------------------------------------------------------

/// A directed connection between two blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Source node id. Not required to match a declared node.
    pub from: NodeId,

    /// Target node id. Not required to match a declared node.
    pub to: NodeId,

    /// Optional text drawn next to the edge (e.g. `"Да"` / `"Нет"` on branches).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Formats the timestamp in server local time as `YYYY-MM-DD HH:MM:SS`.
    pub fn to_local_string(self) -> String {
        self.0
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}
