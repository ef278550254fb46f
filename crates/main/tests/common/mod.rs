use anyhow::{bail, Context, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{self, Child};

/// Starts a service instance as a child process
///
/// The service will be stopped when the process handle is dropped or its `kill` method is called.
/// Returns the process handle of the service.
pub async fn run_service() -> Result<Child> {
    let mut service_proc = process::Command::new(env!("CARGO_BIN_EXE_rsvp-service"))
        .args(["-c", "tests/test-config.toml"])
        .kill_on_drop(true)
        .stdout(Stdio::piped())
        .spawn()
        .context("failed to start rsvp-service")?;

    let service_out = service_proc
        .stdout
        .take()
        .context("can not acquire service output")?;

    let mut reader = BufReader::new(service_out).lines();

    while let Some(ref line) = reader.next_line().await? {
        println!("service: {line}");
        if line.ends_with("Startup finished") {
            break;
        }
    }

    let _log_task = tokio::spawn(async move {
        while let Some(line) = reader.next_line().await? {
            println!("service: {line}");
        }
        Ok::<(), std::io::Error>(())
    });

    if let Some(_exit_code) = service_proc.try_wait()? {
        bail!("Service process died");
    }

    Ok(service_proc)
}
