//! Turns command-line input into the list of feed URLs to check: either the
//! URLs themselves or a file listing them (JSON, OPML or plain text).

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("need one or more urls")]
    NoUrls,
    #[error("`{0}` is not a valid http(s) url")]
    InvalidUrl(String),
    #[error("unsupported url list file `{0}`: expected .json, .opml, .xml or .txt")]
    UnsupportedFile(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid OPML content: {0}")]
    Opml(String),
    #[error("invalid JSON url list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url list `{0}` contains no urls")]
    EmptyList(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum JsonListItem {
    Url(String),
    Object { feed_url: String },
}

/// Resolves command-line arguments to feed URLs.
///
/// When the first argument names an existing list file, the URLs are read
/// from it and the remaining arguments are ignored. Otherwise every argument
/// must itself be a URL.
pub fn resolve_feed_urls(args: &[String]) -> Result<Vec<String>, ImportError> {
    let Some(first) = args.first() else {
        return Err(ImportError::NoUrls);
    };

    let path = Path::new(first);
    if path.is_file() {
        return load_url_file(path);
    }

    args.iter()
        .map(|arg| normalize_feed_url(arg).ok_or_else(|| ImportError::InvalidUrl(arg.clone())))
        .collect()
}

pub fn load_url_file(path: &Path) -> Result<Vec<String>, ImportError> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw = match extension.as_deref() {
        Some("json") => parse_json_urls(&content)?,
        Some("opml" | "xml") => parse_opml(&content)?,
        Some("txt" | "list") => parse_url_list(&content),
        _ => return Err(ImportError::UnsupportedFile(path.to_path_buf())),
    };
    if raw.is_empty() {
        return Err(ImportError::EmptyList(path.to_path_buf()));
    }

    raw.iter()
        .map(|entry| normalize_feed_url(entry).ok_or_else(|| ImportError::InvalidUrl(entry.clone())))
        .collect()
}

/// Accepts absolute http(s) URLs. A scheme-less `host.tld/path` is read as
/// https.
pub fn normalize_feed_url(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let url = if candidate.contains("://") {
        Url::parse(candidate).ok()?
    } else {
        let url = Url::parse(&format!("https://{candidate}")).ok()?;
        // A bare word is not a host.
        if !url.host_str().is_some_and(|host| host.contains('.')) {
            return None;
        }
        url
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(url.to_string())
}

pub fn parse_opml(opml_content: &str) -> Result<Vec<String>, ImportError> {
    let doc = roxmltree::Document::parse(opml_content)
        .map_err(|error| ImportError::Opml(error.to_string()))?;

    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("outline"))
        .filter_map(|node| node.attribute("xmlUrl"))
        .map(str::trim)
        .filter(|feed_url| !feed_url.is_empty())
        .map(ToString::to_string)
        .collect())
}

pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// A JSON array of URL strings or `{ "feed_url": ... }` objects.
pub fn parse_json_urls(input: &str) -> Result<Vec<String>, ImportError> {
    let items: Vec<JsonListItem> = serde_json::from_str(input)?;
    Ok(items
        .into_iter()
        .map(|item| match item {
            JsonListItem::Url(feed_url) | JsonListItem::Object { feed_url } => feed_url,
        })
        .collect())
}
