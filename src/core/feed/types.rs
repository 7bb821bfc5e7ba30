use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One status change listed inside an item's description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentEntry {
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub service_name: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    /// Sorted most recent first; never empty.
    pub incidents: Vec<IncidentEntry>,
}

impl FeedItem {
    /// Status of the incident entry with the latest timestamp. Equal
    /// timestamps resolve to the entry listed first.
    pub fn current_status(&self) -> &str {
        self.incidents
            .iter()
            .reduce(|best, entry| {
                if entry.timestamp > best.timestamp {
                    entry
                } else {
                    best
                }
            })
            .map(|entry| entry.status.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRejection {
    pub title: Option<String>,
    pub reason: String,
}

/// A parsed feed document: the valid items plus the ones that were dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedStatusFeed {
    pub service_name: String,
    pub items: Vec<FeedItem>,
    pub rejected: Vec<ItemRejection>,
}
