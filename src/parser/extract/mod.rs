pub mod links;
pub mod metadata;
pub mod table;

use serde::Serialize;

use super::blocks::Block;
use super::sections::{self, Section};
use super::ParserOptions;
use metadata::Metadata;
use table::ItineraryItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub metadata: Metadata,
    pub items: Vec<ItineraryItem>,
}

/// Table first: without an itinerary table there is nothing to return, so
/// metadata is not extracted at all.
pub fn extract_all(
    blocks: &[Block],
    sections: &[Section],
    options: &ParserOptions,
) -> Option<ParseResult> {
    let items = table::extract(blocks, &options.labels)?;
    let metadata = metadata::extract(blocks, sections, sections::title(blocks), options);
    Some(ParseResult { metadata, items })
}
