use std::collections::BTreeMap;

use crate::types::{EntityStats, Message};

/// Folds messages into per-class statistics, keyed by class name.
pub fn aggregate(messages: &[Message]) -> BTreeMap<String, EntityStats> {
    let mut stats: BTreeMap<String, EntityStats> = BTreeMap::new();

    for msg in messages {
        let entry = stats
            .entry(msg.entity_class_name.clone())
            .or_insert_with(|| EntityStats::new(msg.entity_class_name.clone()));

        entry.count += 1;
        if msg.is_error {
            entry.errors += 1;
        }
        if !entry.instances.contains(&msg.entity_instance) {
            entry.instances.push(msg.entity_instance.clone());
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use chrono::Utc;

    fn message(class: &str, instance: &str, is_error: bool) -> Message {
        Message {
            id: String::new(),
            index: 0,
            timestamp: Utc::now(),
            capture_time: None,
            direction: Direction::OltToOnu,
            transaction_id: "0x0000".to_string(),
            message_kind: "Get".to_string(),
            entity_class_id: "256".to_string(),
            entity_class_name: class.to_string(),
            entity_instance: instance.to_string(),
            attributes: Vec::new(),
            raw: String::new(),
            result_code: None,
            is_error,
        }
    }

    #[test]
    fn test_aggregate_counts_instances_and_errors() {
        let messages = vec![
            message("ONT-G", "0x0000", false),
            message("ONT-G", "0x0000", true),
            message("ONT-G", "0x0001", false),
        ];

        let stats = aggregate(&messages);
        assert_eq!(
            stats["ONT-G"],
            EntityStats {
                class_name: "ONT-G".to_string(),
                count: 3,
                instances: vec!["0x0000".to_string(), "0x0001".to_string()],
                errors: 1,
            }
        );
    }

    #[test]
    fn test_aggregate_separates_classes() {
        let messages = vec![
            message("T-CONT", "0x8001", false),
            message("ONT-G", "0x0000", false),
            message("T-CONT", "0x8002", false),
        ];

        let stats = aggregate(&messages);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["T-CONT"].count, 2);
        assert_eq!(stats["T-CONT"].instances, vec!["0x8001", "0x8002"]);
        assert_eq!(stats["ONT-G"].count, 1);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }
}
