use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#+)\s+(.+)$").unwrap());

/// One classified source line. Every variant keeps the raw line so sections
/// can be re-joined without losing indentation.
#[derive(Debug, Clone, PartialEq)]
pub enum Block<'a> {
    Heading { level: usize, text: &'a str, raw: &'a str },
    Row(&'a str),
    Text(&'a str),
    Empty(&'a str),
}

impl<'a> Block<'a> {
    pub fn raw(&self) -> &'a str {
        match *self {
            Block::Heading { raw, .. } => raw,
            Block::Row(raw) | Block::Text(raw) | Block::Empty(raw) => raw,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }
}

/// Classify every line of `markdown`. Leading whitespace of the whole
/// document is dropped first, so a title indented on the first line still
/// counts as a heading.
pub fn classify_lines(markdown: &str) -> Vec<Block<'_>> {
    markdown
        .trim_start()
        .lines()
        .map(classify_line)
        .collect()
}

fn classify_line(line: &str) -> Block<'_> {
    if line.trim().is_empty() {
        return Block::Empty(line);
    }

    // ── Heading: # text, ## text, ... ──
    if let Some(caps) = HEADING_RE.captures(line) {
        let level = caps.get(1).map_or(0, |m| m.as_str().len());
        let text = caps.get(2).map_or("", |m| m.as_str().trim());
        return Block::Heading { level, text, raw: line };
    }

    // ── Table row: anything carrying a cell delimiter ──
    if line.contains('|') {
        return Block::Row(line);
    }

    Block::Text(line)
}
