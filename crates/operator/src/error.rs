//! Error types for the MPIJob operator crate

use std::fmt;
use thiserror::Error;

/// Category of a rejected MPIJob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// No usable replica role, or a launcher group with a count other than 1
    MissingReplicaRoles,
    /// `slotsPerWorker` set to a value below 1
    InvalidSlotsPerWorker,
    /// A replica role key outside Launcher/Worker
    UnknownReplicaRole,
    /// `mainContainer` missing from a replica pod template
    MainContainerNotFound,
    /// The persisted document could not be decoded at all
    StructuralDecodeError,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::MissingReplicaRoles => "MissingReplicaRoles",
            ValidationErrorKind::InvalidSlotsPerWorker => "InvalidSlotsPerWorker",
            ValidationErrorKind::UnknownReplicaRole => "UnknownReplicaRole",
            ValidationErrorKind::MainContainerNotFound => "MainContainerNotFound",
            ValidationErrorKind::StructuralDecodeError => "StructuralDecodeError",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected MPIJob: what went wrong, where, and what was expected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {field}: {message}{}", expectation(.expected, .actual))]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Dotted path of the offending field, e.g. `spec.mpiReplicaSpecs[Launcher].replicas`
    pub field: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub(crate) fn structural(field: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(
            ValidationErrorKind::StructuralDecodeError,
            field,
            message.to_string(),
        )
    }
}

fn expectation(expected: &Option<String>, actual: &Option<String>) -> String {
    match (expected, actual) {
        (Some(expected), Some(actual)) => format!(" (expected {expected}, got {actual})"),
        (Some(expected), None) => format!(" (expected {expected})"),
        (None, Some(actual)) => format!(" (got {actual})"),
        (None, None) => String::new(),
    }
}

/// Failures registering types at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{identity} is already registered as {existing}, refusing to register {attempted}")]
    Conflict {
        identity: String,
        existing: &'static str,
        attempted: &'static str,
    },
}

/// Top-level error of the operator crate
#[derive(Error, Debug)]
pub enum OperatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to encode MPIJob as JSON: {0}")]
    EncodeJson(#[from] serde_json::Error),

    #[error("Failed to encode MPIJob as YAML: {0}")]
    EncodeYaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, OperatorError>;
