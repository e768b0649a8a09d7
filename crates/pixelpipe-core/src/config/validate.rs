//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::store::OutputFormat;

use super::Config;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.processing.threads == Some(0) {
            return Err(ConfigError::ValidationError(
                "processing.threads must be > 0 when set".into(),
            ));
        }
        if self.output.formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "output.formats must list at least one format".into(),
            ));
        }
        if let Some(unknown) = self
            .output
            .formats
            .iter()
            .find(|f| OutputFormat::from_extension(f).is_none())
        {
            return Err(ConfigError::ValidationError(format!(
                "output.formats contains unsupported format '{unknown}'"
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
