//! Persisted representation of MPIJobs
//!
//! Documents are decoded into a generic JSON value first so the envelope and
//! the replica role keys can be checked before the typed decode. That way an
//! unknown role surfaces as `UnknownReplicaRole` with the offending key rather
//! than as an opaque serde message.

use crate::crd::{MPIJOB_KIND, MPIJob, ReplicaType};
use crate::error::{Result, ValidationError};
use kube::Resource;
use serde::Deserialize;
use serde_json::Value;

pub fn decode_json(input: &str) -> std::result::Result<MPIJob, ValidationError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| ValidationError::structural("document", e))?;
    decode_value(value)
}

pub fn decode_yaml(input: &str) -> std::result::Result<MPIJob, ValidationError> {
    let value: Value =
        serde_yaml::from_str(input).map_err(|e| ValidationError::structural("document", e))?;
    decode_value(value)
}

/// Decode every `---` separated document of a YAML stream.
///
/// Empty documents are skipped. A document the parser cannot read ends the
/// stream, since nothing after it can be located reliably.
pub fn decode_yaml_stream(input: &str) -> Vec<std::result::Result<MPIJob, ValidationError>> {
    let mut jobs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        match Value::deserialize(document) {
            Ok(Value::Null) => continue,
            Ok(value) => jobs.push(decode_value(value)),
            Err(e) => {
                jobs.push(Err(ValidationError::structural("document", e)));
                break;
            }
        }
    }
    jobs
}

/// Decode an already parsed document
pub fn decode_value(value: Value) -> std::result::Result<MPIJob, ValidationError> {
    check_envelope(&value)?;
    check_replica_roles(&value)?;
    serde_json::from_value(value).map_err(|e| ValidationError::structural("document", e))
}

pub fn encode_json(job: &MPIJob) -> Result<String> {
    Ok(serde_json::to_string_pretty(job)?)
}

pub fn encode_yaml(job: &MPIJob) -> Result<String> {
    Ok(serde_yaml::to_string(job)?)
}

fn check_envelope(value: &Value) -> std::result::Result<(), ValidationError> {
    let Some(object) = value.as_object() else {
        return Err(ValidationError::structural(
            "document",
            "an MPIJob document must be a mapping",
        ));
    };

    let expected_api_version = MPIJob::api_version(&());
    expect_string_field(object.get("apiVersion"), "apiVersion", &expected_api_version)?;
    expect_string_field(object.get("kind"), "kind", MPIJOB_KIND)?;
    Ok(())
}

fn expect_string_field(
    value: Option<&Value>,
    field: &str,
    expected: &str,
) -> std::result::Result<(), ValidationError> {
    match value.and_then(Value::as_str) {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(ValidationError::structural(
            field,
            format!("unexpected {field}"),
        )
        .with_expected(expected)
        .with_actual(actual)),
        None => Err(
            ValidationError::structural(field, format!("missing or non-string {field}"))
                .with_expected(expected),
        ),
    }
}

fn check_replica_roles(value: &Value) -> std::result::Result<(), ValidationError> {
    // Shape errors are left to the typed decode below.
    let Some(replica_specs) = value
        .pointer("/spec/mpiReplicaSpecs")
        .and_then(Value::as_object)
    else {
        return Ok(());
    };

    for key in replica_specs.keys() {
        key.parse::<ReplicaType>()?;
    }
    Ok(())
}
