//! Status and source tags carried by every result document

use serde::{Deserialize, Serialize};

/// Where the consumption figures came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Retrieved from the utility portal
    Live,
    /// Generated series (fallback or demo)
    Synthetic,
    /// Reproducible demo series requested with a pinned flag
    Mock,
}

/// Which path produced the document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Live API retrieval succeeded
    Success,
    /// Live retrieval failed, synthetic fallback
    Mock,
    /// Explicit demo mode
    Demo,
    /// Written by the external page scraper. This crate never produces
    /// it but reads such documents back (`show`, cron re-read).
    Scraped,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Live => write!(f, "live"),
            DataSource::Synthetic => write!(f, "synthetic"),
            DataSource::Mock => write!(f, "mock"),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Mock => write!(f, "mock"),
            RunStatus::Demo => write!(f, "demo"),
            RunStatus::Scraped => write!(f, "scraped"),
        }
    }
}
