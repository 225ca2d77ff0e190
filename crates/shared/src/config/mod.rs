//! Configuration module for the MPIJob operator
//!
//! Configuration is loaded once at startup, validated, and passed around as an
//! immutable DTO.
//!
//! # Usage
//!
//! ```ignore
//! use mpijob_shared::config::ConfigLoader;
//! use std::path::PathBuf;
//!
//! let loader = ConfigLoader::new(Some(PathBuf::from(".env")));
//! let config = loader.load_operator_config()?;
//! println!("Default namespace: {}", config.namespace);
//! ```
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `MPIJOB_NAMESPACE`: Namespace assumed for manifests without one (default: "default")
//! - `MPIJOB_AGGREGATE_ERRORS`: "1" reports every violation instead of the first (default: 0)
//! - `MPIJOB_OUTPUT_FORMAT`: "yaml" or "json" (default: "yaml")
//! - `RUST_LOG`: Log filter, e.g. "debug" or "mpijob_operator=debug,info" (default: "info")

pub mod dto;
pub mod error;
pub mod loader;
pub mod validator;

pub use dto::{AdmissionConfig, LoggingConfig, OperatorConfigDto, OutputFormat};
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use validator::{validate_log_level, validate_namespace, validate_operator_config};
