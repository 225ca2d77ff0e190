//! Observed state of a training job
//!
//! Written only by the reconciliation loop. Nothing in this crate mutates it.

use super::ReplicaType;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JobStatus defines the observed state of an MPIJob
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// Conditions in the order they were observed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<JobCondition>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub replica_statuses: BTreeMap<ReplicaType, ReplicaStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconcile_time: Option<Time>,
}

impl JobStatus {
    /// Most recently appended condition, shown in the `State` printer column
    pub fn latest_condition(&self) -> Option<&JobCondition> {
        self.conditions.last()
    }

    pub fn has_condition(&self, condition_type: JobConditionType) -> bool {
        self.conditions
            .iter()
            .any(|c| c.condition_type == condition_type && c.is_true())
    }

    pub fn is_succeeded(&self) -> bool {
        self.has_condition(JobConditionType::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        self.has_condition(JobConditionType::Failed)
    }

    pub fn is_finished(&self) -> bool {
        self.is_succeeded() || self.is_failed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, JsonSchema, Serialize)]
pub enum JobConditionType {
    Created,
    Running,
    Restarting,
    Succeeded,
    Failed,
    Suspended,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobCondition {
    #[serde(rename = "type")]
    pub condition_type: JobConditionType,

    /// One of `True`, `False` or `Unknown`
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
}

impl JobCondition {
    pub fn is_true(&self) -> bool {
        self.status == "True"
    }
}

/// Pod counts of one replica group
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub succeeded: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<i32>,

    /// Serialized label selector matching the pods of this group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}
