//! Field extraction for one OMCI record chunk.
//!
//! Each field has its own rule, a pure function returning `None` when the
//! chunk does not carry that field. `extract_message` composes the rules with
//! their fallbacks, so extraction itself cannot fail.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::serde_utils::upsert_field;
use crate::types::{
    Direction, Message, DEFAULT_CLASS_ID, DEFAULT_HEX_ID, UNKNOWN_ENTITY, UNKNOWN_KIND,
};

/// Result texts that count as success. Matched as case-insensitive substrings.
pub const SUCCESS_PHRASES: &[&str] = &[
    "success",
    "processed successfully",
    "00",
    "0x00",
    "command processed successfully",
];

const BANNER_KEYWORD: &str = "omci protocol";

static SUMMARY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(\d+\.\d+)").expect("summary line regex"));

static BANNER_SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i),\s*(?:OLT\s?>|ONU\s?<)\s*([^-]+)\s*-\s*(.+)$").expect("banner summary regex")
});

// `=` only: the `Message Type: 0x44` header byte line must not match.
static MESSAGE_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Message Type\s*=\s*([^(\n\r]+)").expect("message type regex"));

static ENTITY_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Managed Entity Class:\s*([^(\n\r]+)\s*\((0x[0-9a-f]+|\d+)\)")
        .expect("entity class regex")
});

static ENTITY_INSTANCE: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)Managed Entity Instance:\s*(0x[0-9a-f]+|\d+)").expect("instance regex"),
        Regex::new(r"(?i)Instance\s*=\s*(0x[0-9a-f]+|\d+)").expect("instance regex"),
    ]
});

static TRANSACTION_ID: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)Transaction Correlation ID:\s*(0x[0-9a-f]+|\d+)").expect("transaction regex"),
        Regex::new(r"(?i)Transaction ID:\s*(0x[0-9a-f]+|\d+)").expect("transaction regex"),
    ]
});

static RESULT: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)Result:\s*([^(\n\r]+?)\s*\((?:0x[0-9a-f]+|\d+)\)").expect("result regex"),
        Regex::new(r"(?i)Result:\s*([^\n\r]+)").expect("result regex"),
    ]
});

static BITMASK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[01.\s]+=").expect("bitmask regex"));

static HARDWARE_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^ethernet\b|\b[0-9a-f]{2}(?::[0-9a-f]{2}){5}\b").expect("hardware address regex")
});

static STRUCTURAL_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:transaction correlation|transaction id|message type|device identifier|message identifier|managed entity|attribute mask|omci protocol|frame\b)",
    )
    .expect("structural label regex")
});

/// What the `OMCI Protocol, ...` banner line says about a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    pub direction: Direction,
    pub kind: Option<String>,
    pub entity: Option<String>,
}

fn lines(chunk: &str) -> impl Iterator<Item = &str> {
    chunk.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn first_capture(patterns: &[Regex], chunk: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(chunk))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Record number and relative capture time from the capture summary line,
/// e.g. `174 9.664179 ZTE_00:11:22 ...`.
pub fn summary_line(chunk: &str) -> Option<(u64, Option<f64>)> {
    lines(chunk).find_map(|line| {
        let caps = SUMMARY_LINE.captures(line)?;
        let index = caps[1].parse::<u64>().ok()?;
        Some((index, caps[2].parse::<f64>().ok()))
    })
}

pub fn banner_line(chunk: &str) -> Option<&str> {
    lines(chunk).find(|l| l.to_lowercase().contains(BANNER_KEYWORD))
}

/// Direction plus the provisional operation and entity names from the
/// banner line. Direction defaults to OLT -> ONU.
pub fn banner(chunk: &str) -> Option<Banner> {
    let line = banner_line(chunk)?;

    let direction = if line.contains("ONU<") || line.contains("ONU <") {
        Direction::OnuToOlt
    } else {
        Direction::OltToOnu
    };

    let (kind, entity) = match BANNER_SUMMARY.captures(line) {
        Some(caps) => (
            Some(caps[1].trim().to_string()).filter(|s| !s.is_empty()),
            Some(caps[2].trim().to_string()).filter(|s| !s.is_empty()),
        ),
        None => (None, None),
    };

    Some(Banner { direction, kind, entity })
}

pub fn detailed_kind(chunk: &str) -> Option<String> {
    first_capture(std::slice::from_ref(&*MESSAGE_TYPE), chunk)
}

/// `(name, id)` from `Managed Entity Class: Name (id)`.
pub fn entity_class(chunk: &str) -> Option<(String, String)> {
    let caps = ENTITY_CLASS.captures(chunk)?;
    let name = caps[1].trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some((name, caps[2].trim().to_string()))
}

pub fn entity_instance(chunk: &str) -> Option<String> {
    first_capture(&*ENTITY_INSTANCE, chunk).and_then(|raw| normalize_hex_id(&raw))
}

pub fn transaction_id(chunk: &str) -> Option<String> {
    first_capture(&*TRANSACTION_ID, chunk).and_then(|raw| normalize_hex_id(&raw))
}

pub fn result_text(chunk: &str) -> Option<String> {
    first_capture(&*RESULT, chunk)
}

/// Normalizes an identifier to lowercase `0x` hex.
///
/// Decimal input is zero-padded to four hex digits (`171` -> `0x00ab`).
/// Input that is already `0x`-prefixed is only lowercased (`0xAB` -> `0xab`).
pub fn normalize_hex_id(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Some(digits) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return Some(format!("0x{}", digits.to_ascii_lowercase()));
    }

    let value = raw.parse::<u64>().ok()?;
    Some(format!("0x{:04x}", value))
}

pub fn is_success(result: &str) -> bool {
    let lower = result.to_lowercase();
    SUCCESS_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// True for lines that are capture-tool framing rather than message body.
fn is_framing_line(line: &str) -> bool {
    BITMASK_LINE.is_match(line)
        || SUMMARY_LINE.is_match(line)
        || HARDWARE_ADDRESS.is_match(line)
        || line.to_lowercase().contains(BANNER_KEYWORD)
        || STRUCTURAL_LABEL.is_match(line)
}

/// Body `key: value` pairs in encounter order. Reading stops at the trailer.
pub fn attributes(chunk: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    for line in lines(chunk) {
        if line.to_lowercase().contains("trailer") {
            break;
        }
        if !line.contains(':') || is_framing_line(line) {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() || key.starts_with('0') || key.starts_with('.') {
            continue;
        }

        upsert_field(&mut fields, key.to_string(), value.to_string());
    }

    fields
}

/// Builds a complete message from one chunk. `position` is the chunk's
/// zero-based place among the kept chunks.
pub fn extract_message(chunk: &str, position: usize, timestamp: DateTime<Utc>) -> Message {
    let (index, capture_time) = summary_line(chunk).unwrap_or((position as u64 + 1, None));
    let banner = banner(chunk).unwrap_or_default();

    let message_kind = detailed_kind(chunk)
        .or(banner.kind)
        .unwrap_or_else(|| UNKNOWN_KIND.to_string());

    let (entity_class_name, entity_class_id) = entity_class(chunk).unwrap_or_else(|| {
        (
            banner.entity.unwrap_or_else(|| UNKNOWN_ENTITY.to_string()),
            DEFAULT_CLASS_ID.to_string(),
        )
    });

    let result_code = result_text(chunk);
    let is_error = result_code.as_deref().is_some_and(|r| !is_success(r));

    Message {
        id: format!("msg-{}-{}", index, position),
        index,
        timestamp,
        capture_time,
        direction: banner.direction,
        transaction_id: transaction_id(chunk).unwrap_or_else(|| DEFAULT_HEX_ID.to_string()),
        message_kind,
        entity_class_id,
        entity_class_name,
        entity_instance: entity_instance(chunk).unwrap_or_else(|| DEFAULT_HEX_ID.to_string()),
        attributes: attributes(chunk),
        raw: chunk.to_string(),
        result_code,
        is_error,
    }
}
