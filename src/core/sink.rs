use super::pipeline::{Diagnostic, PipelineError, RunReport};
use super::status::filter::{NoIncidents, RunResult};
use super::status::ServiceStatus;

/// Receiver of a finished run.
///
/// A completed run produces diagnostics, then either statuses or the
/// sentinel, then exactly one `on_complete`. A failed run produces only
/// `on_error`.
pub trait StatusSink {
    fn on_status(&mut self, status: &ServiceStatus);
    fn on_no_incidents(&mut self, sentinel: &NoIncidents);
    fn on_diagnostic(&mut self, _diagnostic: &Diagnostic) {}
    fn on_complete(&mut self);
    fn on_error(&mut self, error: &PipelineError);
}

pub fn deliver<S>(outcome: &Result<RunReport, PipelineError>, sink: &mut S)
where
    S: StatusSink + ?Sized,
{
    let report = match outcome {
        Ok(report) => report,
        Err(error) => {
            sink.on_error(error);
            return;
        }
    };

    for diagnostic in &report.diagnostics {
        sink.on_diagnostic(diagnostic);
    }
    match &report.result {
        RunResult::Active(statuses) => {
            for status in statuses {
                sink.on_status(status);
            }
        }
        RunResult::NoIncidents(sentinel) => sink.on_no_incidents(sentinel),
    }
    sink.on_complete();
}
