//! Splits a capture-tool text export into per-record chunks.
//!
//! Every record in a Wireshark text export begins with the column banner
//! `No.     Time           Source ...`. The banner line stays at the head of
//! the chunk it introduces since the record number is printed right below it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Keyword that marks a chunk as an OMCI record rather than capture noise.
pub const PROTOCOL_KEYWORD: &str = "omci";

static RECORD_BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)No\.\s+Time\s+Source").expect("record banner regex"));

/// Splits `text` in front of every record banner. Chunks are borrowed
/// verbatim; nothing is trimmed or dropped here.
pub fn split_records(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;

    for banner in RECORD_BANNER.find_iter(text) {
        if banner.start() > start {
            chunks.push(&text[start..banner.start()]);
        }
        start = banner.start();
    }
    chunks.push(&text[start..]);

    chunks
}

pub fn has_record_banner(text: &str) -> bool {
    RECORD_BANNER.is_match(text)
}

/// True when a chunk carries the protocol keyword and is not blank.
pub fn is_protocol_chunk(chunk: &str) -> bool {
    let trimmed = chunk.trim();
    !trimmed.is_empty() && trimmed.to_lowercase().contains(PROTOCOL_KEYWORD)
}

/// Splits the export and keeps only the chunks that look like OMCI records.
pub fn segment(text: &str) -> Vec<&str> {
    let raw = split_records(text);
    let total = raw.len();

    let chunks: Vec<&str> = raw.into_iter().filter(|c| is_protocol_chunk(c)).collect();
    debug!("Segmented {} raw chunks, kept {} OMCI chunks", total, chunks.len());

    chunks
}
