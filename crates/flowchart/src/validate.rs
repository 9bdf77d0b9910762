//! Structural validation of decoded model output.

use serde_json::{Map, Value};

use crate::ValidationError;

const NODE_FIELDS: [&str; 3] = ["id", "label", "shape"];
const EDGE_FIELDS: [&str; 2] = ["from", "to"];

/// Checks that `value` has the shape of a graph description.
///
/// The top-level value must be an object carrying `nodes` and `edges` arrays;
/// every node must carry `id`, `label`, and `shape`; every edge must carry
/// `from` and `to`. Nothing is repaired and nothing is returned: callers
/// decode the original value afterwards.
pub fn validate_graph_value(value: &Value) -> Result<(), ValidationError> {
    let root = value
        .as_object()
        .ok_or(ValidationError::MissingTopLevelKeys)?;

    let (Some(nodes), Some(edges)) = (root.get("nodes"), root.get("edges")) else {
        return Err(ValidationError::MissingTopLevelKeys);
    };

    let nodes = nodes
        .as_array()
        .ok_or(ValidationError::NotAnArray { key: "nodes" })?;
    let edges = edges
        .as_array()
        .ok_or(ValidationError::NotAnArray { key: "edges" })?;

    for (index, node) in nodes.iter().enumerate() {
        if !has_fields(node, &NODE_FIELDS) {
            return Err(ValidationError::NodeMissingField { index });
        }
    }

    for (index, edge) in edges.iter().enumerate() {
        if !has_fields(edge, &EDGE_FIELDS) {
            return Err(ValidationError::EdgeMissingField { index });
        }
    }

    Ok(())
}

fn has_fields(entry: &Value, fields: &[&str]) -> bool {
    entry
        .as_object()
        .is_some_and(|obj: &Map<String, Value>| fields.iter().all(|f| obj.contains_key(*f)))
}
