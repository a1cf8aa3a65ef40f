//! External command execution with a time limit.

use crate::error::{CollectError, CollectResult};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Run `program` with `args` and return its standard output.
///
/// The child is killed if it outlives `limit`. A nonzero exit status means
/// "no data" and is returned as an error rather than parsed.
pub async fn run_command(program: &str, args: &[&str], limit: Duration) -> CollectResult<String> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout(limit, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(CollectError::Spawn {
                program: program.to_string(),
                reason: e.to_string(),
            })
        }
        Err(_) => return Err(CollectError::Timeout),
    };

    if !output.status.success() {
        debug!(
            program,
            args = ?args,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "Command exited unsuccessfully"
        );
        return Err(CollectError::ProcessFailed {
            program: program.to_string(),
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
