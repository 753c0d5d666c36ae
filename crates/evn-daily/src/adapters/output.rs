//! JSON Output Store
//!
//! The result document on disk, pretty-printed UTF-8, overwritten each run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{PipelineError, ResultDocument};

pub struct JsonOutputStore {
    path: PathBuf,
}

impl JsonOutputStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn write(&self, document: &ResultDocument) -> Result<(), PipelineError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PipelineError::persistence(parent, e))?;
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| PipelineError::persistence(&self.path, e))?;
        fs::write(&self.path, content).map_err(|e| PipelineError::persistence(&self.path, e))?;

        tracing::info!("💾 Saved {}", self.path.display());
        Ok(())
    }

    pub fn read(&self) -> Result<ResultDocument, PipelineError> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| PipelineError::persistence(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| PipelineError::persistence(&self.path, e))
    }
}
