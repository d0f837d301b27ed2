pub mod blocks;
pub mod extract;
pub mod labels;
pub mod sections;

use serde::{Deserialize, Serialize};

pub use extract::metadata::Metadata;
pub use extract::table::ItineraryItem;
pub use extract::ParseResult;
pub use labels::ColumnLabelMap;

/// When the flat-document pattern search is allowed to fill metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Only when the document has no headings at all.
    WhenNoHeadings,
    /// Whenever a field is still empty after the heading-based pass.
    #[default]
    PerField,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub labels: ColumnLabelMap,
    /// Refine the location name from the `旅遊地點` line of the basic-info block.
    pub refine_location: bool,
    pub fallback: FallbackPolicy,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            labels: ColumnLabelMap::default(),
            refine_location: true,
            fallback: FallbackPolicy::default(),
        }
    }
}

/// Itinerary markdown → metadata + table items. Holds only immutable options,
/// so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    options: ParserOptions,
}

impl DocumentParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Three-pass pipeline: markdown → blocks → sections → extracted data.
    /// `None` means the document has no itinerary table.
    pub fn parse(&self, markdown: &str) -> Option<ParseResult> {
        let blocks = blocks::classify_lines(markdown);
        let sections = sections::split_sections(&blocks);
        extract::extract_all(&blocks, &sections, &self.options)
    }

    pub fn sections(&self, markdown: &str) -> Vec<sections::Section> {
        sections::split_sections(&blocks::classify_lines(markdown))
    }
}

/// Parse with default options.
pub fn parse_document(markdown: &str) -> Option<ParseResult> {
    DocumentParser::default().parse(markdown)
}
