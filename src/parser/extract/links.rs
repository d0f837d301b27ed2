use std::sync::LazyLock;

use regex::Regex;

static INLINE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Destination of the first `[label](target)` link in `text`.
pub fn first_target(text: &str) -> Option<&str> {
    INLINE_LINK_RE
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Cell value after link resolution. Address cells collapse to the link
/// target; every other cell is returned as written.
pub fn resolve_cell(content: &str, is_address: bool) -> String {
    if is_address {
        if let Some(target) = first_target(content) {
            return target.to_string();
        }
    }
    content.to_string()
}
