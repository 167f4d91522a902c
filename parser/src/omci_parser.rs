use chrono::{DateTime, Utc};
use std::io::Read;
use tracing::{debug, info};

use crate::aggregator::aggregate;
use crate::base_parser::Parser;
use crate::correlator::Correlator;
use crate::extractor::extract_message;
use crate::segmenter::{has_record_banner, segment, PROTOCOL_KEYWORD};
use crate::types::{AnalysisResult, ParseError, TopologyNode};

/// Analyzes a Wireshark text export of an OMCI exchange.
///
/// Never fails: chunks that are not OMCI records are dropped, and missing
/// fields fall back to their defaults. An input with no OMCI records gives
/// an empty result.
pub fn parse(text: &str) -> AnalysisResult {
    parse_at(text, Utc::now())
}

/// Same as [`parse`], stamping every message with `timestamp`.
pub fn parse_at(text: &str, timestamp: DateTime<Utc>) -> AnalysisResult {
    info!("Starting OMCI text analysis ({} bytes)", text.len());

    let chunks = segment(text);
    let mut correlator = Correlator::new();
    let mut messages = Vec::with_capacity(chunks.len());

    for (position, chunk) in chunks.into_iter().enumerate() {
        let message = extract_message(chunk, position, timestamp);
        debug!(
            "Record {}: {} {} {} ({}) tx={}",
            message.index,
            message.direction.as_str(),
            message.message_kind,
            message.entity_class_name,
            message.entity_instance,
            message.transaction_id
        );
        correlator.observe(&message);
        messages.push(message);
    }

    // Stable: equal record numbers keep capture order.
    messages.sort_by_key(|m| m.index);

    let stats = aggregate(&messages);
    let service_model = correlator.finish();

    info!(
        "OMCI analysis complete: {} messages, {} entity classes, {} service links",
        messages.len(),
        stats.len(),
        service_model.len()
    );

    AnalysisResult {
        messages,
        stats,
        service_model,
        anomalies: Vec::new(),
        topology: TopologyNode::root(),
    }
}

/// Format adapter for Wireshark text exports.
pub struct OmciTextParser;

impl Parser for OmciTextParser {
    fn name(&self) -> &'static str {
        "omci-text"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt", "log", "text"]
    }

    fn can_parse(&self, data: &[u8]) -> bool {
        let sample = String::from_utf8_lossy(data);
        has_record_banner(&sample) || sample.to_lowercase().contains(PROTOCOL_KEYWORD)
    }

    fn parse(&self, mut reader: Box<dyn Read>) -> Result<AnalysisResult, ParseError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        debug!("Read {} bytes of capture text", buffer.len());

        // Stray non-UTF-8 bytes in a capture must not abort the analysis.
        let text = String::from_utf8_lossy(&buffer);
        Ok(parse(&text))
    }
}
