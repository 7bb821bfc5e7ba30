use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    incident_watch_lib::run().await
}
