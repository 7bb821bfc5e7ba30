use std::collections::HashMap;

use super::{LastIncident, ServiceStatus};
use crate::core::feed::types::FeedItem;

/// Groups items by exact service name and keeps the most recently published
/// item of each group.
///
/// Services come out in the order they were first seen. When two items of a
/// service share the latest publish time, the one seen first wins.
pub fn latest_by_service<'a, I>(items: I) -> Vec<ServiceStatus>
where
    I: IntoIterator<Item = &'a FeedItem>,
{
    let mut positions = HashMap::<&str, usize>::new();
    let mut selected: Vec<&FeedItem> = Vec::new();

    for item in items {
        match positions.get(item.service_name.as_str()) {
            Some(&index) => {
                if item.published_at > selected[index].published_at {
                    selected[index] = item;
                }
            }
            None => {
                positions.insert(item.service_name.as_str(), selected.len());
                selected.push(item);
            }
        }
    }

    selected
        .into_iter()
        .map(|item| ServiceStatus {
            service_name: item.service_name.clone(),
            last_incident: LastIncident::from(item),
        })
        .collect()
}
