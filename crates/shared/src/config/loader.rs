//! Configuration loader
//!
//! Loads configuration from an optional .env file and the process environment.

use std::path::{Path, PathBuf};

use super::dto::{AdmissionConfig, LoggingConfig, OperatorConfigDto, OutputFormat};
use super::error::{ConfigError, Result};
use super::validator::validate_operator_config;

pub const ENV_NAMESPACE: &str = "MPIJOB_NAMESPACE";
pub const ENV_AGGREGATE_ERRORS: &str = "MPIJOB_AGGREGATE_ERRORS";
pub const ENV_OUTPUT_FORMAT: &str = "MPIJOB_OUTPUT_FORMAT";
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";

/// Configuration loader
///
/// Variables defined in the .env file are exported into the process
/// environment before it is read. `dotenv` never overrides variables that are
/// already set, so the real environment wins over the file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Optional path to .env file
    env_file_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new ConfigLoader
    ///
    /// ```
    /// use mpijob_shared::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::new(None);
    /// let loader = ConfigLoader::new(Some(".env".into()));
    /// ```
    pub fn new(env_file_path: Option<PathBuf>) -> Self {
        Self { env_file_path }
    }

    /// Load and validate the operator configuration
    pub fn load_operator_config(&self) -> Result<OperatorConfigDto> {
        if let Some(path) = &self.env_file_path {
            self.load_env_file(path)?;
        }

        let config = OperatorConfigDto::from_env()?;
        validate_operator_config(&config)?;

        Ok(config)
    }

    fn load_env_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ConfigError::EnvFileLoad {
                path: path.to_path_buf(),
                source: dotenv::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                )),
            });
        }

        dotenv::from_path(path).map_err(|e| ConfigError::EnvFileLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

impl OperatorConfigDto {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let namespace = lookup(ENV_NAMESPACE).unwrap_or(defaults.namespace);

        let aggregate_errors = match lookup(ENV_AGGREGATE_ERRORS) {
            Some(value) => parse_flag(ENV_AGGREGATE_ERRORS, &value)?,
            None => defaults.admission.aggregate_errors,
        };

        let output_format = match lookup(ENV_OUTPUT_FORMAT) {
            Some(value) => {
                value
                    .parse::<OutputFormat>()
                    .map_err(|_| ConfigError::InvalidValue {
                        var: ENV_OUTPUT_FORMAT.to_string(),
                        value,
                    })?
            }
            None => defaults.admission.output_format,
        };

        let level = lookup(ENV_LOG_LEVEL)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.logging.level);

        Ok(Self {
            namespace,
            admission: AdmissionConfig {
                aggregate_errors,
                output_format,
            },
            logging: LoggingConfig { level },
        })
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
