pub mod aggregate;
pub mod filter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::feed::types::FeedItem;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastIncident {
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub service_name: String,
    pub status: String,
}

impl From<&FeedItem> for LastIncident {
    fn from(item: &FeedItem) -> Self {
        Self {
            published_at: item.published_at,
            title: item.title.clone(),
            service_name: item.service_name.clone(),
            status: item.current_status().to_string(),
        }
    }
}

/// Latest known incident of one service within a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub service_name: String,
    pub last_incident: LastIncident,
}
