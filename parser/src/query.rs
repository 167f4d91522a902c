//! Read-side views over a finished analysis: filtering, MIB grouping and
//! the connected/isolated entity split.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{AnalysisResult, Direction, Message, ServiceLink};

static MIB_HOUSEKEEPING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mib upload|mib next|mib reset").expect("mib regex"));

pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFilter {
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub only_errors: bool,
    #[serde(default)]
    pub search: String,
}

impl MessageFilter {
    pub fn is_empty(&self) -> bool {
        self.direction.is_none() && !self.only_errors && self.search.is_empty()
    }

    pub fn matches(&self, msg: &Message) -> bool {
        if self.only_errors && !msg.is_error {
            return false;
        }
        if self.direction.is_some_and(|d| d != msg.direction) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }

        let term = self.search.to_lowercase();
        msg.entity_class_name.to_lowercase().contains(&term)
            || msg.entity_instance.to_lowercase().contains(&term)
            || msg.message_kind.to_lowercase().contains(&term)
    }
}

/// Messages passing `filter`, in record order.
pub fn filter_messages<'a>(messages: &'a [Message], filter: &MessageFilter) -> Vec<&'a Message> {
    let mut out: Vec<&Message> = messages.iter().filter(|m| filter.matches(m)).collect();
    out.sort_by_key(|m| m.index);
    out
}

pub fn failed_messages(messages: &[Message]) -> Vec<&Message> {
    messages.iter().filter(|m| m.is_error).collect()
}

pub fn is_mib_housekeeping(msg: &Message) -> bool {
    MIB_HOUSEKEEPING.is_match(&msg.message_kind)
}

/// Packet list entry: a single message or a collapsed run of MIB
/// upload/next/reset traffic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PacketView<'a> {
    Single { message: &'a Message },
    MibGroup { id: String, messages: Vec<&'a Message> },
}

/// Collapses consecutive MIB housekeeping messages into groups. A run of
/// one stays a single entry.
pub fn group_mib_sequences(messages: &[Message]) -> Vec<PacketView<'_>> {
    fn flush<'a>(run: &mut Vec<&'a Message>, out: &mut Vec<PacketView<'a>>) {
        match run.len() {
            0 => {}
            1 => out.push(PacketView::Single { message: run[0] }),
            _ => {
                let id = format!("group-{}", run[0].id);
                out.push(PacketView::MibGroup { id, messages: std::mem::take(run) });
            }
        }
        run.clear();
    }

    let mut out = Vec::new();
    let mut run = Vec::new();

    for msg in messages {
        if is_mib_housekeeping(msg) {
            run.push(msg);
        } else {
            flush(&mut run, &mut out);
            out.push(PacketView::Single { message: msg });
        }
    }
    flush(&mut run, &mut out);

    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceNodes {
    pub connected: Vec<ServiceLink>,
    /// `"{class} ({instance})"` entities no link touches
    pub isolated: Vec<String>,
}

pub fn service_nodes(analysis: &AnalysisResult) -> ServiceNodes {
    let linked: HashSet<&str> = analysis
        .service_model
        .iter()
        .flat_map(|l| [l.from.as_str(), l.to.as_str()])
        .collect();

    let isolated = analysis
        .stats
        .iter()
        .flat_map(|(name, stat)| stat.instances.iter().map(move |inst| format!("{} ({})", name, inst)))
        .filter(|entity| !linked.contains(entity.as_str()))
        .collect();

    ServiceNodes {
        connected: analysis.service_model.clone(),
        isolated,
    }
}

/// Class names containing `term`, case-insensitive, at most `limit`.
pub fn suggest_classes<'a>(analysis: &'a AnalysisResult, term: &str, limit: usize) -> Vec<&'a str> {
    if term.is_empty() {
        return Vec::new();
    }
    let term = term.to_lowercase();
    analysis
        .stats
        .keys()
        .filter(|name| name.to_lowercase().contains(&term))
        .take(limit)
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omci_parser::parse;
    use crate::test_fixtures::*;

    fn sample() -> AnalysisResult {
        parse(&[GET_ONT_G_REQUEST, MIB_UPLOAD_RESPONSE_FAILED, CREATE_GEM_REQUEST, CREATE_GEM_RESPONSE].concat())
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let analysis = sample();
        let filter = MessageFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter_messages(&analysis.messages, &filter).len(), 4);
    }

    #[test]
    fn test_filter_by_direction_and_errors() {
        let analysis = sample();

        let upstream = MessageFilter { direction: Some(Direction::OnuToOlt), ..Default::default() };
        let indexes: Vec<u64> = filter_messages(&analysis.messages, &upstream).iter().map(|m| m.index).collect();
        assert_eq!(indexes, vec![20, 175]);

        let errors = MessageFilter { only_errors: true, ..Default::default() };
        let found = filter_messages(&analysis.messages, &errors);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message_kind, "MIB Upload");
        assert_eq!(failed_messages(&analysis.messages).len(), 1);
    }

    #[test]
    fn test_search_matches_class_instance_or_kind() {
        let analysis = sample();

        let by_class = MessageFilter { search: "gem port".to_string(), ..Default::default() };
        assert_eq!(filter_messages(&analysis.messages, &by_class).len(), 2);

        let by_instance = MessageFilter { search: "0x0101".to_string(), ..Default::default() };
        assert_eq!(filter_messages(&analysis.messages, &by_instance).len(), 2);

        let by_kind = MessageFilter { search: "GET".to_string(), ..Default::default() };
        assert_eq!(filter_messages(&analysis.messages, &by_kind).len(), 1);
    }

    #[test]
    fn test_group_mib_sequences() {
        let mib = |index: u64, kind: &str| {
            let mut m = parse(GET_ONT_G_REQUEST).messages.remove(0);
            m.index = index;
            m.id = format!("msg-{}", index);
            m.message_kind = kind.to_string();
            m
        };
        let messages = vec![
            mib(1, "MIB Reset"),
            mib(2, "MIB Upload"),
            mib(3, "MIB Upload Next"),
            mib(4, "Get"),
            mib(5, "MIB Upload Next"),
            mib(6, "Set"),
        ];

        let views = group_mib_sequences(&messages);
        assert_eq!(views.len(), 4);
        match &views[0] {
            PacketView::MibGroup { id, messages } => {
                assert_eq!(id, "group-msg-1");
                assert_eq!(messages.len(), 3);
            }
            other => panic!("expected group, got {:?}", other),
        }
        assert!(matches!(views[1], PacketView::Single { message } if message.index == 4));
        assert!(matches!(views[2], PacketView::Single { message } if message.index == 5));
        assert!(matches!(views[3], PacketView::Single { message } if message.index == 6));
    }

    #[test]
    fn test_service_nodes_split() {
        let analysis = sample();
        let nodes = service_nodes(&analysis);

        assert_eq!(nodes.connected.len(), 3);
        assert!(!nodes.isolated.contains(&"GEM Port Network CTP (0x0101)".to_string()));
        assert!(nodes.isolated.contains(&"ONT-G (0x0000)".to_string()));
        assert!(nodes.isolated.contains(&"ONT Data (0x0000)".to_string()));
    }

    #[test]
    fn test_suggest_classes() {
        let analysis = sample();
        assert_eq!(suggest_classes(&analysis, "ont", DEFAULT_SUGGESTION_LIMIT), vec!["ONT Data", "ONT-G"]);
        assert_eq!(suggest_classes(&analysis, "ont", 1), vec!["ONT Data"]);
        assert!(suggest_classes(&analysis, "", DEFAULT_SUGGESTION_LIMIT).is_empty());
    }
}
