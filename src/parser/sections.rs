use serde::Serialize;

use super::blocks::Block;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub level: usize,
    pub heading: String,
    pub body: String,
}

impl Section {
    /// Case-insensitive containment test against any of `keywords`.
    pub fn heading_contains(&self, keywords: &[&str]) -> bool {
        let lower = self.heading.to_lowercase();
        keywords.iter().any(|kw| lower.contains(&kw.to_lowercase()))
    }
}

/// Split a flat Vec<Block> into sections at every heading, regardless of depth.
/// Lines before the first heading belong to no section.
pub fn split_sections(blocks: &[Block]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(usize, &str)> = None;
    let mut body: Vec<&str> = Vec::new();

    for block in blocks {
        if let Block::Heading { level, text, .. } = block {
            if let Some((lvl, heading)) = current.take() {
                sections.push(build(lvl, heading, &body));
            }
            body.clear();
            current = Some((*level, *text));
            continue;
        }
        if current.is_some() {
            body.push(block.raw());
        }
    }

    if let Some((lvl, heading)) = current {
        sections.push(build(lvl, heading, &body));
    }

    sections
}

fn build(level: usize, heading: &str, body: &[&str]) -> Section {
    Section {
        level,
        heading: heading.to_string(),
        body: body.join("\n").trim().to_string(),
    }
}

/// First heading anywhere in the document, as a candidate display name.
/// Only the text after the last full-width colon, then the last half-width
/// colon, is kept.
pub fn title(blocks: &[Block]) -> Option<String> {
    blocks.iter().find_map(|b| match b {
        Block::Heading { text, .. } => Some(after_last(&after_last(text, '：'), ':')),
        _ => None,
    })
}

/// Keep the text after the last `sep`, trimmed. Text without `sep` is only
/// trimmed.
pub(crate) fn after_last(s: &str, sep: char) -> String {
    s.rsplit(sep).next().unwrap_or(s).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::classify_lines;

    fn sections(md: &str) -> Vec<Section> {
        split_sections(&classify_lines(md))
    }

    #[test]
    fn preamble_is_not_a_section() {
        let s = sections("just prose\nmore prose\n# First\nbody");
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].heading, "First");
        assert_eq!(s[0].body, "body");
    }

    #[test]
    fn no_headings_no_sections() {
        assert!(sections("plain text\n| a | b |").is_empty());
    }

    #[test]
    fn depths_are_equal_splitters() {
        let s = sections("# A\na\n### B\nb\n## C\nc");
        let headings: Vec<&str> = s.iter().map(|x| x.heading.as_str()).collect();
        assert_eq!(headings, ["A", "B", "C"]);
        assert_eq!(s[1].level, 3);
    }

    #[test]
    fn body_trimmed_but_inner_layout_kept() {
        let s = sections("## 注意事項\n\n- one\n  - nested\n\n");
        assert_eq!(s[0].body, "- one\n  - nested");
    }

    #[test]
    fn empty_body() {
        let s = sections("# A\n# B\nb");
        assert_eq!(s[0].body, "");
        assert_eq!(s[1].body, "b");
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let s = sections("## Currency EXCHANGE");
        assert!(s[0].heading_contains(&["exchange"]));
        assert!(!s[0].heading_contains(&["匯率"]));
    }

    #[test]
    fn title_after_last_colon() {
        assert_eq!(title(&classify_lines("# 行程：東京")).as_deref(), Some("東京"));
        assert_eq!(title(&classify_lines("# Trip: Day 1: Osaka")).as_deref(), Some("Osaka"));
        assert_eq!(title(&classify_lines("# A：B: C")).as_deref(), Some("C"));
    }

    #[test]
    fn title_is_first_heading_anywhere() {
        let md = "intro\n\n## 北海道\n# 東京";
        assert_eq!(title(&classify_lines(md)).as_deref(), Some("北海道"));
    }

    #[test]
    fn no_title() {
        assert_eq!(title(&classify_lines("no heading here")), None);
    }
}
