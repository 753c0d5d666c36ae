//! Domain Errors
//!
//! Error taxonomy for the acquisition pipeline. Everything below the
//! assembler is recoverable; only output persistence, synthesis
//! misconfiguration and a failed or timed-out supervised run end a run
//! with a non-zero status.

use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No reachable domain for region {region}")]
    Unreachable { region: String },

    #[error("Authentication rejected on {domain}")]
    AuthRejected { domain: String },

    #[error("No endpoint pair returned both customer and consumption data on {domain}")]
    PartialDataRejected { domain: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Transport error calling {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid consumption records: {0}")]
    InvalidRecords(String),

    #[error("Synthetic data generation failed: {0}")]
    SynthesisFailure(String),

    #[error("Persistence failure at {path}: {message}")]
    PersistenceFailure { path: String, message: String },

    #[error("Run exceeded hard timeout of {secs}s")]
    Timeout { secs: u64 },

    #[error("Pipeline run exited with {}: {stderr}", exit_label(.code))]
    RunnerFailed { code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

impl PipelineError {
    pub fn malformed<E: AsRef<str>, R: ToString>(endpoint: E, reason: R) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.as_ref().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence<P: AsRef<std::path::Path>, M: ToString>(path: P, message: M) -> Self {
        Self::PersistenceFailure {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the error must end the run with a failure status.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PersistenceFailure { .. }
                | Self::Timeout { .. }
                | Self::SynthesisFailure(_)
                | Self::RunnerFailed { .. }
        )
    }

    /// Pipeline stage the error belongs to, used in log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "endpoint",
            Self::AuthRejected { .. } => "auth",
            Self::PartialDataRejected { .. } => "fetch",
            Self::MalformedResponse { .. } | Self::Transport { .. } => "transport",
            Self::InvalidRecords(_) => "assemble",
            Self::SynthesisFailure(_) => "synthesis",
            Self::PersistenceFailure { .. } => "persistence",
            Self::Timeout { .. } | Self::RunnerFailed { .. } => "supervisor",
        }
    }
}
