use feed_rs::model::Entry;

use super::incidents::{parse_incidents, IncidentParseError};
use super::types::{FeedItem, ItemRejection, ParsedStatusFeed};

#[derive(Debug, thiserror::Error)]
pub enum FeedParseError {
    #[error("feed payload is empty")]
    EmptyPayload,
    #[error("xml feed parse error: {0}")]
    Xml(#[from] feed_rs::parser::ParseFeedError),
    #[error("feed has no channel title")]
    MissingChannelTitle,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemParseError {
    #[error("item has no title")]
    MissingTitle,
    #[error("item has a missing or malformed publish date")]
    MissingPublishDate,
    #[error("item has no description")]
    MissingDescription,
    #[error("item description lists no incidents")]
    NoIncidents,
    #[error("item description is malformed: {0}")]
    Incidents(#[from] IncidentParseError),
}

/// Parses one status-page feed. Items that cannot be reduced to a complete
/// incident timeline are returned in `rejected` instead of failing the feed.
pub fn parse_status_feed(raw: &[u8]) -> Result<ParsedStatusFeed, FeedParseError> {
    let trimmed = trim_leading_ascii_whitespace(raw);
    if trimmed.is_empty() {
        return Err(FeedParseError::EmptyPayload);
    }

    let feed = feed_rs::parser::parse(trimmed)?;
    let service_name = feed
        .title
        .map(|text| text.content.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or(FeedParseError::MissingChannelTitle)?;

    let mut items = Vec::with_capacity(feed.entries.len());
    let mut rejected = Vec::new();
    for entry in &feed.entries {
        match item_from_entry(&service_name, entry) {
            Ok(item) => items.push(item),
            Err(error) => rejected.push(ItemRejection {
                title: entry_title(entry),
                reason: error.to_string(),
            }),
        }
    }

    Ok(ParsedStatusFeed {
        service_name,
        items,
        rejected,
    })
}

fn item_from_entry(service_name: &str, entry: &Entry) -> Result<FeedItem, ItemParseError> {
    let title = entry_title(entry).ok_or(ItemParseError::MissingTitle)?;
    let published_at = entry.published.ok_or(ItemParseError::MissingPublishDate)?;
    let description = entry
        .summary
        .as_ref()
        .map(|text| text.content.as_str())
        .ok_or(ItemParseError::MissingDescription)?;

    let mut incidents = parse_incidents(description, published_at)?;
    if incidents.is_empty() {
        return Err(ItemParseError::NoIncidents);
    }
    // Stable, so equal timestamps keep document order.
    incidents.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));

    Ok(FeedItem {
        service_name: service_name.to_string(),
        title,
        published_at,
        incidents,
    })
}

fn entry_title(entry: &Entry) -> Option<String> {
    entry.title.as_ref().map(|text| text.content.trim().to_string())
}

fn trim_leading_ascii_whitespace(raw: &[u8]) -> &[u8] {
    let mut index = 0;
    while index < raw.len() && raw[index].is_ascii_whitespace() {
        index += 1;
    }
    &raw[index..]
}
