//! CRD Definitions for the MPIJob operator
//!
//! The `MPIJob` resource lives in the `kubeflow.org/v1` group and shares its
//! replica, run-policy and status types with the other kubeflow training jobs.
//! Those shared types are defined here; the MPI-specific resource lives in
//! [`mpi_job`].

use crate::error::{ValidationError, ValidationErrorKind};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

mod mpi_job;
mod status;

pub use mpi_job::{
    MPIJOB_DEFAULT_CONTAINER_NAME, MPIJOB_DEFAULT_PORT, MPIJOB_DEFAULT_PORT_NAME,
    MPIJOB_DEFAULT_RESTART_POLICY, MPIJOB_FRAMEWORK_NAME, MPIJOB_GROUP, MPIJOB_KIND,
    MPIJOB_LIST_KIND, MPIJOB_PLURAL, MPIJOB_SINGULAR, MPIJOB_VERSION, MPIJob, MPIJobList,
    MPIJobSpec,
};
pub use status::{JobCondition, JobConditionType, JobStatus, ReplicaStatus};

/// Role of a replica group inside an MPIJob.
///
/// Only two roles exist. Anything else found in a persisted document is
/// rejected when the document is decoded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, JsonSchema, Serialize,
)]
pub enum ReplicaType {
    /// Single coordinating process that starts `mpirun`
    Launcher,
    /// Parallel processes running the distributed computation
    Worker,
}

impl ReplicaType {
    pub const ALL: [ReplicaType; 2] = [ReplicaType::Launcher, ReplicaType::Worker];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaType::Launcher => "Launcher",
            ReplicaType::Worker => "Worker",
        }
    }
}

impl fmt::Display for ReplicaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplicaType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Launcher" => Ok(ReplicaType::Launcher),
            "Worker" => Ok(ReplicaType::Worker),
            other => Err(ValidationError::new(
                ValidationErrorKind::UnknownReplicaRole,
                format!("spec.mpiReplicaSpecs[{other}]"),
                format!("replica role {other:?} is not supported"),
            )
            .with_expected("Launcher or Worker")
            .with_actual(other)),
        }
    }
}

/// Restart policy applied to every pod of a replica group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, JsonSchema, Serialize)]
pub enum RestartPolicy {
    Always,
    OnFailure,
    Never,
    /// Restart decided by the exit code of the main container
    ExitCode,
}

/// Which pods the controller deletes once the job finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, JsonSchema, Serialize)]
pub enum CleanPodPolicy {
    /// Delete every pod
    All,
    /// Delete only pods that are still running
    Running,
    /// Keep every pod for inspection
    #[default]
    None,
}

/// Desired state of one replica group
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSpec {
    /// Number of desired pods. Unset means the role default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pod template used to create every replica of this group
    #[serde(default)]
    pub template: PodTemplateSpec,

    /// Restart policy for all replicas of this group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
}

impl ReplicaSpec {
    pub fn new(replicas: i32) -> Self {
        Self {
            replicas: Some(replicas),
            ..Default::default()
        }
    }

    pub fn with_template(mut self, template: PodTemplateSpec) -> Self {
        self.template = template;
        self
    }

    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = Some(policy);
        self
    }

    /// Names of the regular containers declared in the pod template
    pub fn container_names(&self) -> Vec<&str> {
        self.template
            .spec
            .iter()
            .flat_map(|spec| spec.containers.iter())
            .map(|container| container.name.as_str())
            .collect()
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.container_names().contains(&name)
    }
}

/// Runtime policies shared by all kubeflow training jobs.
///
/// Passed through to the controller untouched.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_pod_policy: Option<CleanPodPolicy>,

    /// Seconds to keep the job around after it finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds_after_finished: Option<i32>,

    /// Upper bound on the job's runtime, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_deadline_seconds: Option<i64>,

    /// Number of retries before the job is marked failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_limit: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_policy: Option<SchedulingPolicy>,

    /// Suspends the job: running pods are deleted and no new pods are created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

/// Gang-scheduling hints for batch schedulers
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_available: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_resources: Option<BTreeMap<String, Quantity>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_timeout_seconds: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{Container, PodSpec};

    fn template_with(names: &[&str]) -> PodTemplateSpec {
        PodTemplateSpec {
            spec: Some(PodSpec {
                containers: names
                    .iter()
                    .map(|name| Container {
                        name: name.to_string(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_replica_type_parses_known_roles() {
        assert_eq!("Launcher".parse::<ReplicaType>().unwrap(), ReplicaType::Launcher);
        assert_eq!("Worker".parse::<ReplicaType>().unwrap(), ReplicaType::Worker);
    }

    #[test]
    fn test_replica_type_rejects_unknown_role() {
        let err = "Coordinator".parse::<ReplicaType>().unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownReplicaRole);
        assert_eq!(err.field, "spec.mpiReplicaSpecs[Coordinator]");
        assert_eq!(err.actual.as_deref(), Some("Coordinator"));
    }

    #[test]
    fn test_replica_type_is_case_sensitive() {
        assert!("worker".parse::<ReplicaType>().is_err());
    }

    #[test]
    fn test_clean_pod_policy_defaults_to_none() {
        assert_eq!(CleanPodPolicy::default(), CleanPodPolicy::None);
        assert_eq!(
            serde_json::to_string(&CleanPodPolicy::None).unwrap(),
            "\"None\""
        );
    }

    #[test]
    fn test_replica_spec_container_names() {
        let spec = ReplicaSpec::new(2).with_template(template_with(&["mpi", "sidecar"]));
        assert_eq!(spec.container_names(), vec!["mpi", "sidecar"]);
        assert!(spec.has_container("sidecar"));
        assert!(!spec.has_container("worker"));
    }

    #[test]
    fn test_replica_spec_without_pod_spec_has_no_containers() {
        let spec = ReplicaSpec::new(1);
        assert!(spec.container_names().is_empty());
    }

    #[test]
    fn test_replica_spec_omits_unset_fields() {
        let json = serde_json::to_value(ReplicaSpec::default()).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("replicas"));
        assert!(!object.contains_key("restartPolicy"));
        assert!(object.contains_key("template"));
    }

    #[test]
    fn test_run_policy_round_trips_explicit_zero() {
        let policy = RunPolicy {
            backoff_limit: Some(0),
            suspend: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"backoffLimit":0,"suspend":false}"#);
        let back: RunPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
