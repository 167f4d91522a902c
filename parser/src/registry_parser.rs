use crate::base_parser::{detect_format, FormatHint, Parser};
use crate::parsers::all_parsers;
use crate::{AnalysisResult, ParseError};
use std::io::{Cursor, Read};
use tracing::{debug, error, info, warn};

/// Bytes sniffed from the head of an upload for format detection
pub const SAMPLE_SIZE: usize = 4096;

/// ParserRegistry - manages available input formats and auto-detects them
///
/// ## Adding a New Format
///
/// Only `parsers.rs` needs to change. See that module for instructions.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn Parser>>,
}

impl ParserRegistry {
    /// Create a new registry with every parser from `parsers::all_parsers()`
    pub fn new() -> Self {
        info!("Initializing ParserRegistry");
        let parsers = all_parsers();

        info!("Registered {} parsers: {}",
            parsers.len(),
            parsers.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
        );

        Self { parsers }
    }

    /// Register a custom parser
    pub fn register(&mut self, parser: Box<dyn Parser>) {
        info!("Registering custom parser: {}", parser.name());
        debug!("Parser supports extensions: {:?}", parser.extensions());
        self.parsers.push(parser);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Get parser by name
    pub fn get_parser(&self, name: &str) -> Option<&dyn Parser> {
        debug!("Looking up parser by name: {}", name);
        let result = self.parsers.iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref());

        if result.is_none() {
            warn!("Parser not found: {}", name);
        }

        result
    }

    /// Get parser by file extension (case-insensitive)
    pub fn get_parser_by_extension(&self, extension: &str) -> Option<&dyn Parser> {
        let extension = extension.to_ascii_lowercase();
        debug!("Looking up parser by extension: {}", extension);
        let result = self.parsers.iter()
            .find(|p| p.extensions().iter().any(|ext| *ext == extension))
            .map(|p| p.as_ref());

        match result {
            Some(parser) => info!("Selected parser '{}' for extension '.{}'", parser.name(), extension),
            None => warn!("No parser found for extension '.{}'", extension),
        }

        result
    }

    /// Auto-detect the format from the head of the data, then parse all of it
    pub fn parse_auto(&self, mut reader: Box<dyn Read>) -> Result<(&'static str, AnalysisResult), ParseError> {
        info!("Starting auto-detection of input format");

        let mut sample = Vec::with_capacity(SAMPLE_SIZE);
        reader.by_ref().take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
        debug!("Read {} byte sample for format detection", sample.len());

        let format = detect_format(&sample);
        info!("Format hint from content analysis: {:?}", format);

        let parser = match format {
            FormatHint::OmciText => self.get_parser("omci-text"),
            FormatHint::AnalysisJson => self.get_parser("analysis-json"),
            FormatHint::Unknown => {
                warn!("Format unknown, trying parsers individually");
                self.parsers.iter()
                    .find(|p| {
                        let can_parse = p.can_parse(&sample);
                        debug!("Parser '{}' can_parse result: {}", p.name(), can_parse);
                        can_parse
                    })
                    .map(|p| p.as_ref())
            }
        };

        match parser {
            Some(parser) => {
                info!("Selected parser: {}", parser.name());
                let combined = Box::new(Cursor::new(sample).chain(reader));
                Ok((parser.name(), parser.parse(combined)?))
            }
            None => {
                error!("Unable to detect format - no suitable parser found");
                Err(ParseError::UnsupportedFormat("unable to detect input format".to_string()))
            }
        }
    }

    /// Parse with a filename hint; unknown extensions fall back to auto-detection.
    /// Returns the name of the parser that handled the data along with the result.
    pub fn parse_with_hint(
        &self,
        reader: Box<dyn Read>,
        filename: &str,
    ) -> Result<(&'static str, AnalysisResult), ParseError> {
        info!("Parsing file with hint: {}", filename);

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("");
        debug!("Extracted extension: '{}'", extension);

        if let Some(parser) = self.get_parser_by_extension(extension) {
            info!("Using parser '{}' for file '{}'", parser.name(), filename);
            Ok((parser.name(), parser.parse(reader)?))
        } else {
            warn!("No parser found for extension '{}', falling back to auto-detection", extension);
            self.parse_auto(reader)
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
