pub mod error;
pub mod parser;
pub mod passthrough;
pub mod settings;

pub use parser::{
    parse_document, ColumnLabelMap, DocumentParser, FallbackPolicy, ItineraryItem, Metadata,
    ParseResult, ParserOptions,
};
