//! Detail panel payloads, keyed by record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::models::RecordKey;

/// Expandable supplementary content for one record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailPayload {
    #[serde(default)]
    pub sections: Vec<DetailSection>,

    /// Raw source attributes, shown in the collapsible "Full Data" section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailSection {
    pub title: String,
    #[serde(default)]
    pub entries: Vec<DetailEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailEntry {
    pub label: String,
    pub value: String,
}

impl DetailPayload {
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty()) && self.raw.is_none()
    }

    /// Pretty-printed raw data, if any.
    pub fn raw_pretty(&self) -> Option<String> {
        self.raw
            .as_ref()
            .map(|raw| serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string()))
    }
}

/// Record key -> detail payload. Built once at load time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailRegistry {
    entries: HashMap<RecordKey, DetailPayload>,
}

impl DetailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: RecordKey, payload: DetailPayload) {
        if !payload.is_empty() {
            self.entries.insert(key, payload);
        }
    }

    pub fn get(&self, key: RecordKey) -> Option<&DetailPayload> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
