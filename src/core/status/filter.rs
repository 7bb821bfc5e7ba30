use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ServiceStatus;

/// Status literal that closes an incident. Compared exactly.
pub const RESOLVED_STATUS: &str = "Resolved";
pub const NO_INCIDENTS_MESSAGE: &str = "No incidents found!";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoIncidents {
    pub empty: bool,
    pub message: String,
}

impl Default for NoIncidents {
    fn default() -> Self {
        Self {
            empty: true,
            message: NO_INCIDENTS_MESSAGE.to_string(),
        }
    }
}

/// Outcome of one run: either at least one active service, or the sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RunResult {
    Active(Vec<ServiceStatus>),
    NoIncidents(NoIncidents),
}

impl RunResult {
    pub fn statuses(&self) -> &[ServiceStatus] {
        match self {
            Self::Active(statuses) => statuses,
            Self::NoIncidents(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoIncidents(_))
    }
}

/// True when the latest incident was published on `now`'s UTC date and is
/// not resolved.
pub fn is_active_today(status: &ServiceStatus, now: DateTime<Utc>) -> bool {
    status.last_incident.published_at.date_naive() == now.date_naive()
        && status.last_incident.status != RESOLVED_STATUS
}

pub fn filter_active(statuses: Vec<ServiceStatus>, now: DateTime<Utc>) -> RunResult {
    let active: Vec<ServiceStatus> = statuses
        .into_iter()
        .filter(|status| is_active_today(status, now))
        .collect();

    if active.is_empty() {
        RunResult::NoIncidents(NoIncidents::default())
    } else {
        RunResult::Active(active)
    }
}
