//! One status-check run: concurrent fetch of every feed, a barrier until all
//! of them settle, then parse, aggregate and filter over the collected items.
//!
//! Failed fetches never reach the parser. They are reported as
//! [`Diagnostic::Fetch`] next to the result, the same way dropped feeds and
//! items are.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::config::WatchConfig;
use super::feed::fetcher::{build_client, fetch_feed, FetchError, FetchedFeed};
use super::feed::parser::parse_status_feed;
use super::feed::types::FeedItem;
use super::status::aggregate::latest_by_service;
use super::status::filter::{filter_active, RunResult};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("http client setup failed: {0}")]
    Client(#[from] FetchError),
    #[error("fetch task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Non-fatal problem met during a run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    Fetch {
        url: String,
        message: String,
    },
    Feed {
        url: String,
        message: String,
    },
    Item {
        url: String,
        title: Option<String>,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunReport {
    pub result: RunResult,
    pub diagnostics: Vec<Diagnostic>,
}

/// Settled fetch of one URL.
#[derive(Debug)]
pub struct FeedFetch {
    pub url: String,
    pub outcome: Result<FetchedFeed, FetchError>,
}

#[derive(Debug, Clone)]
pub struct StatusCheck {
    client: reqwest::Client,
}

impl StatusCheck {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &WatchConfig) -> Result<Self, PipelineError> {
        let client = build_client(Duration::from_secs(config.timeout_secs), &config.user_agent)?;
        Ok(Self::new(client))
    }

    pub async fn run(&self, urls: &[String]) -> Result<RunReport, PipelineError> {
        self.run_at(urls, Utc::now()).await
    }

    /// Runs the check with `now` deciding which calendar day counts as today.
    /// Dropping the returned future aborts every in-flight fetch.
    pub async fn run_at(
        &self,
        urls: &[String],
        now: DateTime<Utc>,
    ) -> Result<RunReport, PipelineError> {
        let fetched = fetch_all(&self.client, urls).await?;
        Ok(assemble(fetched, now))
    }
}

/// Fetches every URL concurrently and waits for all of them. Results come
/// back in input order.
pub async fn fetch_all(
    client: &reqwest::Client,
    urls: &[String],
) -> Result<Vec<FeedFetch>, PipelineError> {
    let mut tasks = JoinSet::new();
    for (index, url) in urls.iter().enumerate() {
        let client = client.clone();
        let url = url.clone();
        tasks.spawn(async move {
            let outcome = fetch_feed(&client, &url).await;
            (index, FeedFetch { url, outcome })
        });
    }

    let mut settled: Vec<Option<FeedFetch>> = urls.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, fetch) = joined?;
        debug!(url = %fetch.url, ok = fetch.outcome.is_ok(), "fetch settled");
        settled[index] = Some(fetch);
    }
    Ok(settled.into_iter().flatten().collect())
}

/// Parses the settled fetches and reduces them to a run report.
pub fn assemble(fetched: Vec<FeedFetch>, now: DateTime<Utc>) -> RunReport {
    let mut diagnostics = Vec::new();
    let mut items: Vec<FeedItem> = Vec::new();

    for FeedFetch { url, outcome } in fetched {
        let feed = match outcome {
            Ok(feed) => feed,
            Err(error) => {
                warn!(%url, %error, "feed fetch failed");
                diagnostics.push(Diagnostic::Fetch {
                    url,
                    message: error.to_string(),
                });
                continue;
            }
        };

        let parsed = match parse_status_feed(&feed.body) {
            Ok(parsed) => parsed,
            Err(error) => {
                let message = match feed.content_type.as_deref() {
                    Some(content_type) => format!("{error} (content type {content_type})"),
                    None => error.to_string(),
                };
                warn!(%url, %message, "feed dropped");
                diagnostics.push(Diagnostic::Feed { url, message });
                continue;
            }
        };

        for rejection in parsed.rejected {
            warn!(%url, title = ?rejection.title, reason = %rejection.reason, "item dropped");
            diagnostics.push(Diagnostic::Item {
                url: url.clone(),
                title: rejection.title,
                message: rejection.reason,
            });
        }
        debug!(%url, service = %parsed.service_name, items = parsed.items.len(), "feed parsed");
        items.extend(parsed.items);
    }

    let statuses = latest_by_service(&items);
    info!(
        items = items.len(),
        services = statuses.len(),
        "aggregated feed items"
    );

    RunReport {
        result: filter_active(statuses, now),
        diagnostics,
    }
}
