use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

use crate::{ModelError, ProcessOutput};

/// Runs a local inference process to completion
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Spawn `binary`, wait for it to exit and collect its output.
    ///
    /// The child is killed when the timeout elapses.
    pub async fn spawn(
        binary: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, ModelError> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, Self::run(binary, args))
                .await
                .map_err(|_| ModelError::Timeout(limit))?,
            None => Self::run(binary, args).await,
        }
    }

    async fn run(binary: &Path, args: &[String]) -> Result<ProcessOutput, ModelError> {
        let start = Instant::now();
        debug!(
            binary = %binary.display(),
            arg_count = args.len(),
            "Spawning inference process"
        );

        let child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ModelError::BackendUnavailable(format!("{}: {}", binary.display(), e))
                }
                _ => ModelError::InferenceFailed(format!(
                    "Failed to start {}: {}",
                    binary.display(),
                    e
                )),
            })?;

        // Dropping this future (on timeout) drops the child, which kills it
        let output = child.wait_with_output().await.map_err(|e| {
            ModelError::InferenceFailed(format!("Failed to collect output: {}", e))
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let duration = start.elapsed();
        debug!(
            exit_code,
            duration_ms = duration.as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            "Inference process finished"
        );

        Ok(ProcessOutput::new(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
            duration,
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collects_stdout_and_stderr() {
        let output = ProcessSpawner::spawn(
            Path::new("sh"),
            &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()],
            None,
        )
        .await
        .unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr_tail(), "err");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }
}
