use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::table::HEADER_KEYWORD;
use crate::parser::blocks::Block;
use crate::parser::sections::{after_last, Section};
use crate::parser::{FallbackPolicy, ParserOptions};

const BASIC_INFO_KEYWORDS: &[&str] = &["基礎資訊", "匯率"];
const REMINDER_KEYWORDS: &[&str] = &["特別提醒", "注意事項"];
const EXCLUSION_KEYWORDS: &[&str] = &["排除景點", "不建議"];

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\*\*)?旅遊地點(?:\*\*)?[：:]\**[ \t]*([^*\r\n][^\r\n]*)").unwrap()
});

static BASIC_INFO_LABEL: LazyLock<Label> = LazyLock::new(|| Label::new(BASIC_INFO_KEYWORDS));
static REMINDER_LABEL: LazyLock<Label> = LazyLock::new(|| Label::new(REMINDER_KEYWORDS));

/// A label line in a flat document: the keyword opens the line, after an
/// optional list marker and bold markers (`- **特別提醒**：...`).
struct Label {
    keywords: &'static [&'static str],
    line: Regex,
    inline: Regex,
}

impl Label {
    fn new(keywords: &'static [&'static str]) -> Self {
        let alt = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            keywords,
            line: Regex::new(&format!(r"^\s*[-*]*\s*\**\s*(?:{alt})")).unwrap(),
            inline: Regex::new(&format!(r"(?:{alt})[*\s]*[：:][*\s]*(.*)$")).unwrap(),
        }
    }

    fn starts(&self, line: &str) -> bool {
        self.line.is_match(line)
    }

    /// Headings match the way section roles do, anywhere in the text.
    fn in_heading(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }

    /// Text on the label line itself, when a colon directly follows a keyword.
    fn inline_text<'a>(&self, line: &'a str) -> &'a str {
        self.inline
            .captures(line)
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(rename = "基礎資訊")]
    pub basic_info: String,
    #[serde(rename = "特別提醒")]
    pub reminders: String,
    #[serde(rename = "locationName")]
    pub location_name: String,
}

/// Which role a section plays. Basic info is tested first, then reminders,
/// then exclusions; a section takes at most one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    BasicInfo,
    Reminder,
    Exclusion,
}

fn role(section: &Section) -> Option<Role> {
    if section.heading_contains(BASIC_INFO_KEYWORDS) {
        Some(Role::BasicInfo)
    } else if section.heading_contains(REMINDER_KEYWORDS) {
        Some(Role::Reminder)
    } else if section.heading_contains(EXCLUSION_KEYWORDS) {
        Some(Role::Exclusion)
    } else {
        None
    }
}

pub fn extract(
    blocks: &[Block],
    sections: &[Section],
    title: Option<String>,
    options: &ParserOptions,
) -> Metadata {
    let mut meta = Metadata {
        location_name: title.unwrap_or_default(),
        ..Metadata::default()
    };

    let mut reminders: Vec<String> = Vec::new();
    let mut exclusions: Vec<String> = Vec::new();

    for section in sections {
        match role(section) {
            Some(Role::BasicInfo) => {
                meta.basic_info = section.body.clone();
                if options.refine_location {
                    refine_location(&mut meta.location_name, &section.body);
                }
            }
            Some(Role::Reminder) => reminders.push(section.body.clone()),
            Some(Role::Exclusion) => {
                exclusions.push(format!("### {}\n{}", section.heading, section.body));
            }
            None => {}
        }
    }

    meta.reminders = join_blocks(exclusions.iter().chain(reminders.iter()));

    let (fill_basic, fill_reminders) = match options.fallback {
        FallbackPolicy::Never => (false, false),
        FallbackPolicy::WhenNoHeadings => (sections.is_empty(), sections.is_empty()),
        FallbackPolicy::PerField => (meta.basic_info.is_empty(), meta.reminders.is_empty()),
    };

    if fill_basic {
        if let Some(basic) = capture_after_marker(blocks, &BASIC_INFO_LABEL, &REMINDER_LABEL) {
            debug!("basic info taken from direct pattern search");
            if options.refine_location {
                refine_location(&mut meta.location_name, &basic);
            }
            meta.basic_info = basic;
        }
    }
    if fill_reminders {
        if let Some(reminders) = capture_after_marker(blocks, &REMINDER_LABEL, &BASIC_INFO_LABEL) {
            debug!("reminders taken from direct pattern search");
            meta.reminders = reminders;
        }
    }

    meta
}

/// Join non-empty, trimmed contributions with a blank line.
fn join_blocks<'a>(parts: impl Iterator<Item = &'a String>) -> String {
    parts
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Overwrite `location` with the `旅遊地點` value found in `basic_info`, if any.
fn refine_location(location: &mut String, basic_info: &str) {
    if let Some(value) = location_from_basic_info(basic_info) {
        *location = value;
    }
}

/// `**旅遊地點：** 京都，大阪(備案)` → `大阪`. The text after the last
/// full-width comma, then the last half-width comma, with any parenthesized
/// remainder removed.
pub fn location_from_basic_info(basic_info: &str) -> Option<String> {
    let caps = LOCATION_RE.captures(basic_info)?;
    let value = caps.get(1)?.as_str().trim();
    let value = after_last(&after_last(value, '，'), ',');
    let value = strip_parenthesized(&value).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Drop everything from the first `(`: through the last `)` when there is
/// one, otherwise to the end. Full-width parentheses are left alone.
fn strip_parenthesized(value: &str) -> String {
    let Some(open) = value.find('(') else {
        return value.to_string();
    };
    match value.rfind(')').filter(|&close| close > open) {
        Some(close) => format!("{}{}", &value[..open], &value[close + 1..]),
        None => value[..open].to_string(),
    }
}

/// Direct pattern search over the flat document: the text following the first
/// `label` line, up to the next top-level heading, the itinerary table header,
/// the next `stop` label line, or the end.
fn capture_after_marker(blocks: &[Block], label: &Label, stop: &Label) -> Option<String> {
    let start = blocks.iter().position(|b| label.starts(b.raw()))?;
    let tail = label.inline_text(blocks[start].raw());

    let mut lines: Vec<&str> = Vec::new();
    if !tail.trim().is_empty() {
        lines.push(tail);
    }
    for block in &blocks[start + 1..] {
        let end = match block {
            Block::Heading { level: 1, .. } => true,
            Block::Heading { text, .. } => stop.in_heading(text),
            Block::Row(raw) => raw.contains(HEADER_KEYWORD),
            Block::Text(raw) => stop.starts(raw),
            Block::Empty(_) => false,
        };
        if end {
            break;
        }
        lines.push(block.raw());
    }

    let text = lines.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}
