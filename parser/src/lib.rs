// Parser crate for OMCI protocol-analyzer text exports
// Segment -> extract -> correlate -> aggregate, plus a registry of input formats

pub mod types;
pub mod serde_utils;
pub mod base_parser;
pub mod parsers;
pub mod registry_parser;

// Analysis pipeline
pub mod segmenter;
pub mod extractor;
pub mod correlator;
pub mod aggregator;
pub mod query;

// Input format implementations
pub mod omci_parser;
pub mod json_parser;

#[cfg(test)]
mod test_fixtures;

// Re-export main types
pub use types::*;
pub use base_parser::{Parser, FormatHint};
pub use registry_parser::ParserRegistry;
pub use omci_parser::{parse, parse_at};

// Re-export parsers
pub use omci_parser::OmciTextParser;
pub use json_parser::AnalysisJsonParser;
