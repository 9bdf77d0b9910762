use std::fmt::Write;

use flowchart::GraphDescription;

/// Builds Graphviz DOT source for `graph`.
///
/// Nodes and edges are emitted in declaration order. Edge endpoints that name
/// no declared node are left to Graphviz, which draws them as default nodes.
pub fn to_dot(graph: &GraphDescription) -> String {
    let mut out = String::with_capacity(64 + 64 * (graph.nodes.len() + graph.edges.len()));
    out.push_str("digraph Flowchart {\n");

    for node in &graph.nodes {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "\t{} [label={} shape={}]",
            quote(node.id.as_str()),
            quote(&node.label),
            quote(&node.shape)
        );
    }

    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "\t{} -> {} [label={}]",
            quote(edge.from.as_str()),
            quote(edge.to.as_str()),
            quote(edge.label.as_deref().unwrap_or(""))
        );
    }

    out.push_str("}\n");
    out
}

/// Quotes `s` as a DOT string literal.
///
/// Backslash sequences such as `\n` or `\l` are Graphviz label escapes and
/// pass through unchanged. Only unescaped `"` is escaped, and a trailing odd
/// backslash is doubled so it cannot swallow the closing quote.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    let mut backslashes = 0usize;
    for ch in s.chars() {
        match ch {
            '\\' => {
                backslashes += 1;
                quoted.push(ch);
                continue;
            }
            '"' if backslashes % 2 == 0 => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => continue,
            c => quoted.push(c),
        }
        backslashes = 0;
    }
    if backslashes % 2 == 1 {
        quoted.push('\\');
    }
    quoted.push('"');
    quoted
}
