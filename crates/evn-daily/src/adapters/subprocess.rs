//! Subprocess Runner
//!
//! Runs the acquisition pipeline as a child process. The child is killed
//! when the execution future is dropped, which is how the supervisor's
//! hard timeout takes effect.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::domain::PipelineError;
use crate::ports::{PipelineRunner, RunnerExit};

pub struct SubprocessRunner {
    program: PathBuf,
    args: Vec<String>,
}

impl SubprocessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[async_trait]
impl PipelineRunner for SubprocessRunner {
    async fn execute(&self) -> Result<RunnerExit, PipelineError> {
        tracing::debug!(program = %self.program.display(), args = ?self.args, "Spawning pipeline run");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PipelineError::RunnerFailed {
                code: None,
                stderr: format!("failed to spawn {}: {}", self.program.display(), e),
            })?;

        Ok(RunnerExit {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_code_and_output_are_captured() {
        let exit = SubprocessRunner::new("sh")
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3")
            .execute()
            .await
            .unwrap();

        assert_eq!(exit.code, Some(3));
        assert_eq!(exit.stdout.trim(), "out");
        assert_eq!(exit.stderr.trim(), "err");
        assert!(!exit.is_success());
    }

    #[tokio::test]
    async fn test_missing_program_is_runner_failure() {
        let err = SubprocessRunner::new("/nonexistent/evn-daily")
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::RunnerFailed { code: None, .. }));
    }
}
