//! MPIJob CRD - a launcher plus N workers running one MPI program

use super::{CleanPodPolicy, JobStatus, ReplicaSpec, ReplicaType, RestartPolicy, RunPolicy};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::{CustomResource, CustomResourceExt, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MPIJOB_GROUP: &str = "kubeflow.org";
pub const MPIJOB_VERSION: &str = "v1";
pub const MPIJOB_KIND: &str = "MPIJob";
pub const MPIJOB_LIST_KIND: &str = "MPIJobList";
pub const MPIJOB_PLURAL: &str = "mpijobs";
pub const MPIJOB_SINGULAR: &str = "mpijob";
pub const MPIJOB_FRAMEWORK_NAME: &str = "mpi";

/// Name of the port used between the launcher and the workers
pub const MPIJOB_DEFAULT_PORT_NAME: &str = "mpi-port";
pub const MPIJOB_DEFAULT_PORT: i32 = 9999;

/// Container that runs the MPI program when `mainContainer` is not set
pub const MPIJOB_DEFAULT_CONTAINER_NAME: &str = "mpi";
pub const MPIJOB_DEFAULT_RESTART_POLICY: RestartPolicy = RestartPolicy::Never;

/// MPIJob CRD
#[derive(CustomResource, Clone, Debug, Default, Deserialize, JsonSchema, Serialize, PartialEq)]
#[kube(
    group = "kubeflow.org",
    version = "v1",
    kind = "MPIJob",
    plural = "mpijobs",
    singular = "mpijob",
    namespaced,
    status = "JobStatus",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.conditions[-1:].type"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MPIJobSpec {
    /// Slots per worker written to the hostfile. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots_per_worker: Option<i32>,

    /// Pods to delete once the job completes. Defaults to `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_pod_policy: Option<CleanPodPolicy>,

    /// Replica groups keyed by role
    #[serde(default)]
    pub mpi_replica_specs: BTreeMap<ReplicaType, ReplicaSpec>,

    /// Container executing the MPI program; its exit code decides the job outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_container: Option<String>,

    #[serde(default)]
    pub run_policy: RunPolicy,
}

impl MPIJobSpec {
    pub fn with_replica(mut self, replica_type: ReplicaType, spec: ReplicaSpec) -> Self {
        self.mpi_replica_specs.insert(replica_type, spec);
        self
    }

    pub fn with_slots_per_worker(mut self, slots: i32) -> Self {
        self.slots_per_worker = Some(slots);
        self
    }

    pub fn with_clean_pod_policy(mut self, policy: CleanPodPolicy) -> Self {
        self.clean_pod_policy = Some(policy);
        self
    }

    pub fn with_main_container(mut self, name: impl Into<String>) -> Self {
        self.main_container = Some(name.into());
        self
    }

    pub fn replica_spec(&self, replica_type: ReplicaType) -> Option<&ReplicaSpec> {
        self.mpi_replica_specs.get(&replica_type)
    }

    pub fn replicas_for(&self, replica_type: ReplicaType) -> Option<i32> {
        self.replica_spec(replica_type).and_then(|spec| spec.replicas)
    }

    /// Main container name, falling back to the default one
    pub fn effective_main_container(&self) -> &str {
        self.main_container
            .as_deref()
            .unwrap_or(MPIJOB_DEFAULT_CONTAINER_NAME)
    }

    /// Number of MPI processes the hostfile describes: slots × worker replicas.
    ///
    /// `None` until both values are known, or on overflow.
    pub fn total_worker_processes(&self) -> Option<i32> {
        let slots = self.slots_per_worker?;
        let workers = self.replicas_for(ReplicaType::Worker)?;
        slots.checked_mul(workers)
    }
}

impl MPIJob {
    /// CustomResourceDefinition manifest rendered as YAML
    pub fn crd_yaml() -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&MPIJob::crd())
    }
}

/// A page of MPIJobs as returned by a list call
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MPIJobList {
    #[serde(default = "list_api_version")]
    pub api_version: String,

    #[serde(default = "list_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ListMeta,

    #[serde(default)]
    pub items: Vec<MPIJob>,
}

fn list_api_version() -> String {
    MPIJob::api_version(&()).into_owned()
}

fn list_kind() -> String {
    MPIJOB_LIST_KIND.to_string()
}

impl MPIJobList {
    pub fn new(items: Vec<MPIJob>) -> Self {
        Self {
            api_version: list_api_version(),
            kind: list_kind(),
            metadata: ListMeta::default(),
            items,
        }
    }
}

impl Default for MPIJobList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
