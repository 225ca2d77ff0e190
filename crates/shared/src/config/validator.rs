//! Configuration validation

use super::dto::OperatorConfigDto;
use super::error::{ConfigError, Result};
use tracing_subscriber::EnvFilter;

/// Validate a namespace name (RFC 1123 label)
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(ConfigError::Validation(
            "Namespace cannot be empty".to_string(),
        ));
    }

    if namespace.len() > 63 {
        return Err(ConfigError::Validation(format!(
            "Namespace must be at most 63 characters, got {}",
            namespace.len()
        )));
    }

    let valid_chars = namespace
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let alnum_edges = !namespace.starts_with('-') && !namespace.ends_with('-');

    if !valid_chars || !alnum_edges {
        return Err(ConfigError::Validation(format!(
            "Namespace must consist of lowercase alphanumerics or '-', \
             and start and end with an alphanumeric, got: {}",
            namespace
        )));
    }

    Ok(())
}

/// Validate a log filter the way `tracing_subscriber` reads `RUST_LOG`:
/// a level, a target, or a comma separated list of `target=level` directives.
pub fn validate_log_level(level: &str) -> Result<()> {
    EnvFilter::try_new(level)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(format!("Invalid log filter {level}: {e}")))
}

/// Validate the complete operator configuration
pub fn validate_operator_config(config: &OperatorConfigDto) -> Result<()> {
    validate_namespace(&config.namespace)?;
    validate_log_level(&config.logging.level)?;
    Ok(())
}
