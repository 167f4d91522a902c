use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::serde_utils::{deserialize_fields_from_map, serialize_fields_as_map};

/// Sentinel for a missing transaction id or entity instance.
pub const DEFAULT_HEX_ID: &str = "0x0000";
pub const DEFAULT_CLASS_ID: &str = "0";
pub const UNKNOWN_KIND: &str = "Unknown";
pub const UNKNOWN_ENTITY: &str = "Unknown Entity";

/// Which side of the OMCI channel sent a message.
///
/// The OLT originates requests; the ONU answers them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "OLT -> ONU")]
    OltToOnu,
    #[serde(rename = "ONU -> OLT")]
    OnuToOlt,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::OltToOnu => "OLT -> ONU",
            Direction::OnuToOlt => "ONU -> OLT",
        }
    }

    /// True for the request-carrying direction.
    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::OltToOnu)
    }
}

/// One decoded OMCI exchange unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// Record number as printed by the capture tool
    pub index: u64,
    /// Wall-clock time of the parse run
    pub timestamp: DateTime<Utc>,
    /// Seconds since capture start, when the summary line carries it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_time: Option<f64>,
    pub direction: Direction,
    pub transaction_id: String,
    pub message_kind: String,
    pub entity_class_id: String,
    pub entity_class_name: String,
    pub entity_instance: String,
    /// Body fields in encounter order, keys unique
    #[serde(
        default,
        serialize_with = "serialize_fields_as_map",
        deserialize_with = "deserialize_fields_from_map"
    )]
    pub attributes: Vec<(String, String)>,
    #[serde(default)]
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `"{class} ({instance})"`, the form service links use for endpoints.
    pub fn entity_ref(&self) -> String {
        format!("{} ({})", self.entity_class_name, self.entity_instance)
    }
}

/// Aggregate counters for one managed entity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub class_name: String,
    pub count: usize,
    pub instances: Vec<String>,
    pub errors: usize,
}

impl EntityStats {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            count: 0,
            instances: Vec::new(),
            errors: 0,
        }
    }
}

/// A reference from one managed entity to another, confirmed by a
/// successful response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceLink {
    pub from: String,
    pub to: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Olt,
    Onu,
    Tcont,
    Gem,
    Uni,
    Bridge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub children: Vec<TopologyNode>,
}

impl TopologyNode {
    /// Placeholder root; building the real tree is up to the consumer.
    pub fn root() -> Self {
        Self {
            name: "GPON OLT".to_string(),
            kind: NodeKind::Olt,
            entity_id: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub messages: Vec<Message>,
    pub stats: BTreeMap<String, EntityStats>,
    pub service_model: Vec<ServiceLink>,
    #[serde(default)]
    pub anomalies: Vec<String>,
    pub topology: TopologyNode,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            stats: BTreeMap::new(),
            service_model: Vec::new(),
            anomalies: Vec::new(),
            topology: TopologyNode::root(),
        }
    }
}

impl AnalysisResult {
    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_error).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serializes_as_arrow_text() {
        let json = serde_json::to_string(&Direction::OnuToOlt).unwrap();
        assert_eq!(json, r#""ONU -> OLT""#);

        let back: Direction = serde_json::from_str(r#""OLT -> ONU""#).unwrap();
        assert_eq!(back, Direction::OltToOnu);
        assert!(back.is_forward());
    }

    #[test]
    fn test_topology_root_shape() {
        let json = serde_json::to_value(TopologyNode::root()).unwrap();
        assert_eq!(json["name"], "GPON OLT");
        assert_eq!(json["type"], "OLT");
        assert_eq!(json["children"].as_array().unwrap().len(), 0);
        assert!(json.get("entityId").is_none());
    }

    #[test]
    fn test_message_camel_case_fields() {
        let msg = Message {
            id: "msg-1-0".to_string(),
            index: 1,
            timestamp: Utc::now(),
            capture_time: None,
            direction: Direction::OltToOnu,
            transaction_id: "0x0001".to_string(),
            message_kind: "Get".to_string(),
            entity_class_id: "256".to_string(),
            entity_class_name: "ONT-G".to_string(),
            entity_instance: DEFAULT_HEX_ID.to_string(),
            attributes: vec![("Vendor id".to_string(), "ABCD".to_string())],
            raw: String::new(),
            result_code: None,
            is_error: false,
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["transactionId"], "0x0001");
        assert_eq!(json["entityClassName"], "ONT-G");
        assert_eq!(json["attributes"]["Vendor id"], "ABCD");
        assert!(json.get("resultCode").is_none());
        assert_eq!(msg.entity_ref(), "ONT-G (0x0000)");
        assert_eq!(msg.attribute("Vendor id"), Some("ABCD"));
    }
}
