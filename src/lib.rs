pub mod core;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::core::config::{validate_config, ConfigError, WatchConfig};
use crate::core::importer::{resolve_feed_urls, ImportError};
use crate::core::pipeline::{PipelineError, StatusCheck};
use crate::core::sink::{deliver, StatusSink};
use crate::core::status::filter::NoIncidents;
use crate::core::status::ServiceStatus;

const COMPLETE_MESSAGE: &str = "[i] status check completed";

/// Check status-page RSS feeds for incidents reported today and not yet resolved.
#[derive(Debug, Parser)]
#[command(name = "incident-watch", version)]
struct Cli {
    /// Status-page feed URLs, or a path to a .json/.opml/.txt file listing them.
    #[arg(long, required = true, num_args = 1.., value_name = "URL|FILE")]
    urls: Vec<String>,

    /// Per-request timeout in seconds [env: INCIDENT_WATCH_TIMEOUT_SECS].
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// User-Agent header sent with every request [env: INCIDENT_WATCH_USER_AGENT].
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the whole result as a single JSON document.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Writes results to stdout. Progress and diagnostics go through `tracing`.
struct TerminalSink {
    json: bool,
    statuses: Vec<ServiceStatus>,
    sentinel: Option<NoIncidents>,
}

impl TerminalSink {
    fn new(json: bool) -> Self {
        Self {
            json,
            statuses: Vec::new(),
            sentinel: None,
        }
    }

    fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(rendered) => println!("{rendered}"),
            Err(error) => warn!(%error, "failed to render result"),
        }
    }
}

impl StatusSink for TerminalSink {
    fn on_status(&mut self, status: &ServiceStatus) {
        if self.json {
            self.statuses.push(status.clone());
        } else {
            Self::print_json(status);
        }
    }

    fn on_no_incidents(&mut self, sentinel: &NoIncidents) {
        if self.json {
            self.sentinel = Some(sentinel.clone());
        } else {
            println!("{}", sentinel.message);
        }
    }

    fn on_complete(&mut self) {
        if self.json {
            match self.sentinel.take() {
                Some(sentinel) => Self::print_json(&sentinel),
                None => Self::print_json(&self.statuses),
            }
        }
        info!("{COMPLETE_MESSAGE}");
    }

    fn on_error(&mut self, error: &PipelineError) {
        error!(%error, "something wrong occurred");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn execute(cli: Cli) -> Result<ExitCode, AppError> {
    let config = WatchConfig::from_env()?.with_overrides(cli.timeout_secs, cli.user_agent);
    validate_config(&config)?;
    let urls = resolve_feed_urls(&cli.urls)?;
    info!("[i] Check service page statuses: {urls:?}");

    let check = StatusCheck::from_config(&config)?;
    let outcome = check.run(&urls).await;
    let mut sink = TerminalSink::new(cli.json);
    deliver(&outcome, &mut sink);

    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub async fn run() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_requires_urls() {
        assert!(Cli::try_parse_from(["incident-watch"]).is_err());

        let cli = Cli::try_parse_from([
            "incident-watch",
            "--urls",
            "https://status.acme.example/history.rss",
            "status.globex.example/history.rss",
            "--timeout-secs",
            "5",
            "--json",
        ])
        .expect("arguments should parse");
        assert_eq!(cli.urls.len(), 2);
        assert_eq!(cli.timeout_secs, Some(5));
        assert!(cli.json);
    }

    #[test]
    fn json_sink_prints_only_on_completion() {
        let mut sink = TerminalSink::new(true);
        sink.on_no_incidents(&NoIncidents::default());
        assert!(sink.sentinel.is_some());
        sink.on_complete();
        assert!(sink.sentinel.is_none());
    }
}
