//! Recovery of a JSON object from free-form model output.
//!
//! Models often wrap the requested JSON in prose or Markdown fences, and the
//! prose itself may contain braces. Rather than taking everything between the
//! first `{` and the last `}`, the scanner walks the text tracking brace depth
//! (ignoring braces inside string literals) and tries each balanced top-level
//! fragment in order.

use serde_json::Value;

use crate::ExtractionError;

/// Returns the first balanced `{...}` fragment of `raw` that parses as a JSON
/// object.
///
/// Fails with [`ExtractionError::NoObject`] when the text has no balanced
/// fragment, and with [`ExtractionError::Invalid`] (carrying the first parse
/// error) when no fragment parses.
pub fn extract_json_object(raw: &str) -> Result<Value, ExtractionError> {
    let mut first_error = None;

    for fragment in object_fragments(raw) {
        match serde_json::from_str::<Value>(fragment) {
            Ok(value) if value.is_object() => return Ok(value),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "discarding unparseable JSON fragment");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(source) => Err(ExtractionError::Invalid { source }),
        None => Err(ExtractionError::NoObject),
    }
}

/// Yields every balanced top-level `{...}` fragment of `raw`, left to right.
///
/// A `{` that is never closed would otherwise swallow the rest of the text,
/// so scanning resumes one byte after it.
fn object_fragments(raw: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut rest = raw;

    loop {
        let unclosed = balanced_fragments(rest, &mut fragments);
        match unclosed {
            Some(start) => rest = &rest[start + 1..],
            None => return fragments,
        }
    }
}

/// Pushes the balanced fragments of one pass over `raw` and returns the
/// offset of the outermost `{` left open at the end, if any.
fn balanced_fragments<'a>(raw: &'a str, fragments: &mut Vec<&'a str>) -> Option<usize> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in raw.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        fragments.push(&raw[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        start
    } else {
        None
    }
}
