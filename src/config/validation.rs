//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Reject unknown log levels and formats
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.admin.socket_path.trim().is_empty() {
        errors.push(ValidationError {
            field: "admin.socket_path",
            message: "must not be empty".to_string(),
        });
    }

    if config.admin.read_timeout_secs == Some(0) {
        errors.push(ValidationError {
            field: "admin.read_timeout_secs",
            message: "must be greater than 0 when set".to_string(),
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: format!(
                "unknown level '{}', expected one of {}",
                config.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if !LOG_FORMATS.contains(&config.observability.log_format.as_str()) {
        errors.push(ValidationError {
            field: "observability.log_format",
            message: format!(
                "unknown format '{}', expected one of {}",
                config.observability.log_format,
                LOG_FORMATS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
