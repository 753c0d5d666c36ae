//! Pipeline Runner Port
//!
//! The cron wrapper executes the acquisition pipeline as an isolated unit
//! (a child process in production) and only looks at how it exited.

use async_trait::async_trait;

use crate::domain::errors::PipelineError;

/// How a pipeline execution ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerExit {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunnerExit {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes one full acquisition run
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    /// Run to completion. Dropping the future must stop the run.
    async fn execute(&self) -> Result<RunnerExit, PipelineError>;
}
