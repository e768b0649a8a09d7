//! Pipeline execution.
//!
//! - **executor**: runs load → validate → operations → format check → save
//! - **validate**: checks a loaded buffer before any operation runs
//! - **document**: reads operation lists from JSON/TOML pipeline documents
//!
//! Every run ends in exactly one [`PipelineResult`].

pub mod document;
pub mod executor;
pub mod validate;

pub use document::load_operations;
pub use executor::{ExecutorOptions, PipelineExecutor};
pub use validate::Validator;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PipelineError;

/// Terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    Success,
    FileNotFound,
    ConfigError,
    ProcessingError,
    SaveError,
}

impl PipelineStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::SaveError => "SAVE_ERROR",
        })
    }
}

/// Outcome of one pipeline run: a status plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    pub message: String,
}

impl PipelineResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::Success,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl From<PipelineError> for PipelineResult {
    fn from(err: PipelineError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<Result<(), PipelineError>> for PipelineResult {
    fn from(result: Result<(), PipelineError>) -> Self {
        match result {
            Ok(()) => Self::success("Image processed and saved successfully."),
            Err(err) => err.into(),
        }
    }
}
