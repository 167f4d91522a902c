//! Request/response pairing of service references.
//!
//! A Create or Set request from the OLT that sets a pointer-like attribute
//! stages candidate links under its transaction id. The links only become
//! part of the service model once the ONU answers that transaction without
//! an error.
//!
//! Known limitation: only the most recent request per transaction id is
//! tracked. A reused id overwrites earlier staged links, and links whose
//! request never gets a successful answer are dropped silently.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use crate::types::{Message, ServiceLink};

static REFERENCE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)pointer|t-cont|gem|ani-g|uni|bridge|tp|iw").expect("reference key regex")
});

/// Per-run correlation state. Create one per parse.
#[derive(Debug, Default)]
pub struct Correlator {
    pending: HashMap<String, Vec<ServiceLink>>,
    service_model: Vec<ServiceLink>,
}

/// Whether an attribute may reference another managed entity.
pub fn is_reference(key: &str, value: &str) -> bool {
    let hex_prefixed = value
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x"));
    hex_prefixed && REFERENCE_KEY.is_match(key)
}

fn is_configuring(message: &Message) -> bool {
    message.message_kind.contains("Create") || message.message_kind.contains("Set")
}

/// Reference-bearing attributes of a forward Create/Set message as
/// unconfirmed links.
pub fn candidate_links(message: &Message) -> Vec<ServiceLink> {
    if !message.direction.is_forward() || !is_configuring(message) {
        return Vec::new();
    }

    let from = message.entity_ref();
    message
        .attributes
        .iter()
        .filter(|(key, value)| is_reference(key, value))
        .map(|(key, value)| ServiceLink {
            from: from.clone(),
            to: value.clone(),
            label: key.clone(),
        })
        .collect()
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one message, in capture order.
    pub fn observe(&mut self, message: &Message) {
        if message.direction.is_forward() {
            let candidates = candidate_links(message);
            if !candidates.is_empty() {
                debug!(
                    "Staging {} link(s) for transaction {}",
                    candidates.len(),
                    message.transaction_id
                );
                self.pending.insert(message.transaction_id.clone(), candidates);
            }
            return;
        }

        if message.is_error {
            return;
        }

        if let Some(links) = self.pending.remove(&message.transaction_id) {
            debug!(
                "Transaction {} acknowledged, promoting {} link(s)",
                message.transaction_id,
                links.len()
            );
            self.service_model.extend(links);
        }
    }

    pub fn pending_transactions(&self) -> usize {
        self.pending.len()
    }

    /// Returns the confirmed links in promotion order. Anything still
    /// staged is discarded.
    pub fn finish(self) -> Vec<ServiceLink> {
        if !self.pending.is_empty() {
            debug!("Discarding {} unacknowledged transaction(s)", self.pending.len());
        }
        self.service_model
    }
}
