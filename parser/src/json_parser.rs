use crate::{base_parser::Parser, AnalysisResult, ParseError};
use std::io::Read;
use tracing::{error, info};

/// Reloads a previously saved analysis (the serialized `AnalysisResult`).
pub struct AnalysisJsonParser;

impl Parser for AnalysisJsonParser {
    fn name(&self) -> &'static str {
        "analysis-json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn can_parse(&self, data: &[u8]) -> bool {
        let sample = String::from_utf8_lossy(data);
        let trimmed = sample.trim_start();

        trimmed.starts_with('{') && trimmed.contains("\"messages\"")
    }

    fn parse(&self, mut reader: Box<dyn Read>) -> Result<AnalysisResult, ParseError> {
        info!("Loading saved analysis");
        let mut buffer = Vec::new();

        if let Err(e) = reader.read_to_end(&mut buffer) {
            error!("Failed to read analysis data: {}", e);
            return Err(e.into());
        }

        match serde_json::from_slice::<AnalysisResult>(&buffer) {
            Ok(mut analysis) => {
                analysis.messages.sort_by_key(|m| m.index);
                info!("Saved analysis loaded: {} messages", analysis.messages.len());
                Ok(analysis)
            }
            Err(e) => {
                error!("Failed to parse saved analysis: {}", e);
                Err(e.into())
            }
        }
    }
}
