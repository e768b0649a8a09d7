//! Pipeline documents: ordered operation lists stored as JSON or TOML.
//!
//! JSON accepts either a bare array or an object with an `operations` key:
//!
//! ```json
//! [
//!   { "name": "grayscale" },
//!   { "name": "brightness", "parameters": { "factor": 1.2 } },
//!   { "name": "resize", "parameters": { "width": 800, "height": 600 } }
//! ]
//! ```
//!
//! TOML uses an array of tables:
//!
//! ```toml
//! [[operations]]
//! name = "resize"
//! parameters = { width = 800, height = 600 }
//! ```
//!
//! Integer literals become `Int` parameters and literals with a fraction or
//! exponent become `Float`, so `1` and `1.0` are not interchangeable.

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::params::OperationSpec;

/// Serialized forms a pipeline document can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct TomlDocument {
    #[serde(default)]
    operations: Vec<OperationSpec>,
}

/// Read the operation list from a pipeline document on disk.
pub fn load_operations(path: &Path) -> Result<Vec<OperationSpec>, ConfigError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedDocument {
        path: path.to_path_buf(),
    })?;
    let content = std::fs::read_to_string(path)?;
    let operations = parse_operations(&content, format)?;
    tracing::debug!(
        "Loaded {} operation(s) from {:?}",
        operations.len(),
        path
    );
    Ok(operations)
}

/// Parse an operation list from document text.
pub fn parse_operations(
    content: &str,
    format: DocumentFormat,
) -> Result<Vec<OperationSpec>, ConfigError> {
    match format {
        DocumentFormat::Json => parse_json(content),
        DocumentFormat::Toml => Ok(toml::from_str::<TomlDocument>(content)?.operations),
    }
}

fn parse_json(content: &str) -> Result<Vec<OperationSpec>, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let list = match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => map.remove("operations").ok_or_else(|| {
            ConfigError::ValidationError(
                "pipeline document object has no \"operations\" key".into(),
            )
        })?,
        _ => {
            return Err(ConfigError::ValidationError(
                "pipeline document must be an array or an object with \"operations\"".into(),
            ))
        }
    };
    Ok(serde_json::from_value(list)?)
}
