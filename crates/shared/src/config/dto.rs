//! Configuration Data Transfer Objects (DTOs)
//!
//! Immutable configuration handed to the operator binary at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration DTO for the MPIJob operator tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfigDto {
    /// Namespace assumed for manifests that do not set one
    pub namespace: String,

    /// Admission behaviour
    pub admission: AdmissionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for OperatorConfigDto {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            admission: AdmissionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Report every violated invariant instead of stopping at the first one
    pub aggregate_errors: bool,

    /// Format used to print canonical descriptors
    pub output_format: OutputFormat,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives: a level, a target, or `target=level` pairs
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => f.write_str("yaml"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
