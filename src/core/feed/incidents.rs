//! Extraction of the incident timeline embedded in a status-page item.
//!
//! Descriptions carry repeated `<small>timestamp</small> ... <strong>status</strong>`
//! pairs. The fragment is flattened into its elements in document order and
//! scanned with a two-state machine: a caption opens an incident, the next
//! `<b>`/`<strong>` closes it with a status.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc};
use scraper::{ElementRef, Html};

use super::types::IncidentEntry;

const CAPTION_TAG: &str = "small";
const EMPHASIS_TAGS: [&str; 2] = ["b", "strong"];
const SHORT_CAPTION_FORMAT: &str = "%Y %b %d, %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IncidentParseError {
    #[error("caption `{0}` is followed by another caption before any status")]
    NestedCaption(String),
    #[error("caption `{0}` has no status")]
    MissingStatus(String),
    #[error("unrecognized incident timestamp `{0}`")]
    InvalidTimestamp(String),
}

/// Caption/status pair exactly as found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIncident {
    pub caption: String,
    pub status: String,
}

enum ScanState {
    AwaitingCaption,
    AwaitingStatus { caption: String },
}

impl ScanState {
    fn advance(
        self,
        element: ElementRef<'_>,
        found: &mut Vec<RawIncident>,
    ) -> Result<Self, IncidentParseError> {
        let name = element.value().name();
        match self {
            Self::AwaitingCaption if name == CAPTION_TAG => Ok(Self::AwaitingStatus {
                caption: element_text(element),
            }),
            Self::AwaitingStatus { caption } if name == CAPTION_TAG => {
                Err(IncidentParseError::NestedCaption(caption))
            }
            Self::AwaitingStatus { caption } if EMPHASIS_TAGS.contains(&name) => {
                found.push(RawIncident {
                    caption,
                    status: element_text(element),
                });
                Ok(Self::AwaitingCaption)
            }
            // Emphasis outside an open incident is ordinary formatting.
            state => Ok(state),
        }
    }
}

/// Scans the markup and returns caption/status pairs in document order.
pub fn scan_incidents(markup: &str) -> Result<Vec<RawIncident>, IncidentParseError> {
    let fragment = Html::parse_fragment(markup);
    let mut found = Vec::new();
    let mut state = ScanState::AwaitingCaption;

    for element in fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
    {
        state = state.advance(element, &mut found)?;
    }

    match state {
        ScanState::AwaitingCaption => Ok(found),
        ScanState::AwaitingStatus { caption } => Err(IncidentParseError::MissingStatus(caption)),
    }
}

/// Parses the incident entries of one item, in document order. Caption
/// timestamps are resolved against `reference`, the item's publish time.
pub fn parse_incidents(
    markup: &str,
    reference: DateTime<Utc>,
) -> Result<Vec<IncidentEntry>, IncidentParseError> {
    scan_incidents(markup)?
        .into_iter()
        .map(|raw| {
            let timestamp = resolve_timestamp(&raw.caption, reference)
                .ok_or_else(|| IncidentParseError::InvalidTimestamp(raw.caption.clone()))?;
            Ok(IncidentEntry {
                timestamp,
                status: raw.status,
            })
        })
        .collect()
}

/// Turns a caption into an absolute timestamp.
///
/// Accepts RFC 2822, RFC 3339, `Aug 09, 15:38 UTC` (in whichever of the
/// reference's year, the year before or the year after lands closest to the
/// reference) and bare `15:38` on the reference date.
pub fn resolve_timestamp(caption: &str, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caption = caption.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc2822(caption) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(caption) {
        return Some(parsed.with_timezone(&Utc));
    }

    let local = caption.strip_suffix("UTC").unwrap_or(caption).trim_end();
    if let Ok(time) = NaiveTime::parse_from_str(local, "%H:%M") {
        return Some(reference.date_naive().and_time(time).and_utc());
    }

    let in_year = |year: i32| {
        NaiveDateTime::parse_from_str(&format!("{year} {local}"), SHORT_CAPTION_FORMAT)
            .ok()
            .map(|parsed| parsed.and_utc())
    };
    // Nearest to the reference wins: updates may follow the pubDate by days,
    // and an item from late December may carry January updates.
    let year = reference.year();
    [year - 1, year, year + 1]
        .into_iter()
        .filter_map(in_year)
        .min_by_key(|candidate| (*candidate - reference).abs())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 9, 15, 38, 26).unwrap()
    }

    #[test]
    fn scans_caption_and_status_pairs_in_document_order() {
        let markup = r#"
            <p><small>Aug 09, 15:30 UTC</small><br><strong>Resolved</strong> - all good.</p>
            <p><small>Aug 09, 14:10 UTC</small><br><b>Investigating</b> - looking into it.</p>
        "#;
        let found = scan_incidents(markup).expect("markup should scan");

        assert_eq!(
            found,
            vec![
                RawIncident {
                    caption: "Aug 09, 15:30 UTC".to_string(),
                    status: "Resolved".to_string(),
                },
                RawIncident {
                    caption: "Aug 09, 14:10 UTC".to_string(),
                    status: "Investigating".to_string(),
                },
            ]
        );
    }

    #[test]
    fn emphasis_without_open_caption_is_ignored() {
        let markup = "<p><strong>Heads up</strong></p><p><small>09:00</small><strong>Identified</strong></p>";
        let found = scan_incidents(markup).expect("markup should scan");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, "Identified");
    }

    #[test]
    fn caption_without_status_fails() {
        let markup = "<p><small>09:00</small><strong>Investigating</strong></p><p><small>09:30</small> no status</p>";
        let error = scan_incidents(markup).expect_err("dangling caption must fail");

        assert_eq!(error, IncidentParseError::MissingStatus("09:30".to_string()));
    }

    #[test]
    fn second_caption_before_status_fails() {
        let markup = "<p><small>09:00</small><small>09:30</small><strong>Monitoring</strong></p>";
        let error = scan_incidents(markup).expect_err("interleaved captions must fail");

        assert_eq!(error, IncidentParseError::NestedCaption("09:00".to_string()));
    }

    #[test]
    fn nested_caption_fails() {
        let markup = "<small>09:00 <small>09:30</small></small><strong>Monitoring</strong>";
        let error = scan_incidents(markup).expect_err("nested captions must fail");

        assert!(matches!(error, IncidentParseError::NestedCaption(_)));
    }

    #[test]
    fn markup_without_captions_yields_nothing() {
        let found = scan_incidents("<p>Scheduled maintenance notice.</p>").expect("should scan");
        assert!(found.is_empty());
    }

    #[test]
    fn resolves_short_status_page_caption_in_reference_year() {
        let resolved = resolve_timestamp("Aug 09, 14:10 UTC", reference()).expect("should resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2020, 8, 9, 14, 10, 0).unwrap());
    }

    #[test]
    fn short_caption_after_reference_rolls_back_a_year() {
        let january = Utc.with_ymd_and_hms(2021, 1, 2, 8, 0, 0).unwrap();
        let resolved = resolve_timestamp("Dec 31, 23:50 UTC", january).expect("should resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2020, 12, 31, 23, 50, 0).unwrap());
    }

    #[test]
    fn short_caption_days_after_reference_stays_in_reference_year() {
        let published = Utc.with_ymd_and_hms(2020, 8, 7, 10, 0, 0).unwrap();
        let resolved = resolve_timestamp("Aug 09, 12:00 UTC", published).expect("should resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2020, 8, 9, 12, 0, 0).unwrap());
    }

    #[test]
    fn january_update_of_december_item_moves_to_next_year() {
        let december = Utc.with_ymd_and_hms(2020, 12, 31, 22, 0, 0).unwrap();
        let resolved = resolve_timestamp("Jan 02, 08:00 UTC", december).expect("should resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2021, 1, 2, 8, 0, 0).unwrap());
    }

    #[test]
    fn leap_day_caption_falls_back_to_the_leap_year() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let resolved = resolve_timestamp("Feb 29, 10:00 UTC", reference).expect("should resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap());
    }

    #[test]
    fn bare_time_uses_reference_date() {
        let resolved = resolve_timestamp("09:30", reference()).expect("should resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2020, 8, 9, 9, 30, 0).unwrap());
    }

    #[test]
    fn full_timestamps_are_taken_as_is() {
        let rfc2822 = resolve_timestamp("Sun, 09 Aug 2020 17:38:26 +0200", reference())
            .expect("rfc2822 should resolve");
        let rfc3339 = resolve_timestamp("2020-08-09T15:38:26Z", reference())
            .expect("rfc3339 should resolve");
        assert_eq!(rfc2822, reference());
        assert_eq!(rfc3339, reference());
    }

    #[test]
    fn unknown_caption_is_an_invalid_timestamp() {
        let error = parse_incidents("<small>soon</small><strong>Update</strong>", reference())
            .expect_err("caption should not resolve");
        assert_eq!(error, IncidentParseError::InvalidTimestamp("soon".to_string()));
    }
}
