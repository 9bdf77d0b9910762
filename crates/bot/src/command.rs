//! `/block` command parsing.

/// Command prefix. Matching is by prefix, so `/block@my_bot` is accepted too.
pub const BLOCK_COMMAND: &str = "/block";

/// Parses a `/block` command.
///
/// Returns `None` when `text` is not a `/block` command, `Some(None)` when the
/// command carries no algorithm text, and `Some(Some(algorithm))` otherwise.
/// The algorithm is everything after the first whitespace run, trimmed.
pub fn parse_block_command(text: &str) -> Option<Option<&str>> {
    if !text.starts_with(BLOCK_COMMAND) {
        return None;
    }

    let algorithm = text
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty());

    Some(algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_with_algorithm() {
        assert_eq!(
            parse_block_command("/block sort an array"),
            Some(Some("sort an array"))
        );
        assert_eq!(
            parse_block_command("/block@flow_bot   binary search\n"),
            Some(Some("binary search"))
        );
    }

    #[test]
    fn test_command_without_algorithm() {
        assert_eq!(parse_block_command("/block"), Some(None));
        assert_eq!(parse_block_command("/block   "), Some(None));
    }

    #[test]
    fn test_other_text_is_not_a_command() {
        assert_eq!(parse_block_command("/start"), None);
        assert_eq!(parse_block_command("block sort"), None);
        assert_eq!(parse_block_command(""), None);
    }
}
