use crate::segmenter::has_record_banner;
use crate::{AnalysisResult, ParseError};
use std::io::Read;

/// Base trait that all input formats must implement
/// Uses Box<dyn Read> to be object-safe (dyn compatible)
pub trait Parser: Send + Sync {
    /// Returns the name of this parser (e.g., "omci-text", "analysis-json")
    fn name(&self) -> &'static str;

    /// Returns the file extensions this parser supports (e.g., ["txt", "log"])
    fn extensions(&self) -> &'static [&'static str];

    /// Checks if this parser can handle the given data by inspecting content
    fn can_parse(&self, data: &[u8]) -> bool;

    /// Parse the data from a reader into a complete analysis
    fn parse(&self, reader: Box<dyn Read>) -> Result<AnalysisResult, ParseError>;
}

/// Helper to detect format from content
pub fn detect_format(data: &[u8]) -> FormatHint {
    let sample = String::from_utf8_lossy(data);
    let trimmed = sample.trim_start();

    // A saved analysis is a JSON object with a messages array. Checked first
    // because its raw chunks also mention OMCI.
    if trimmed.starts_with('{') && trimmed.contains("\"messages\"") {
        return FormatHint::AnalysisJson;
    }

    if has_record_banner(trimmed) || trimmed.to_lowercase().contains("omci") {
        return FormatHint::OmciText;
    }

    FormatHint::Unknown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    OmciText,
    AnalysisJson,
    Unknown,
}
