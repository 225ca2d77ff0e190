//! Defaulting for MPIJob specs
//!
//! Fills unset optional fields so the controller never has to guess. Only the
//! spec is touched; an MPIJob's status belongs to the controller.

use crate::crd::{
    CleanPodPolicy, MPIJOB_DEFAULT_CONTAINER_NAME, MPIJOB_DEFAULT_RESTART_POLICY, MPIJobSpec,
    ReplicaSpec, ReplicaType,
};
use tracing::debug;

pub const DEFAULT_SLOTS_PER_WORKER: i32 = 1;
pub const DEFAULT_CLEAN_POD_POLICY: CleanPodPolicy = CleanPodPolicy::None;
pub const DEFAULT_LAUNCHER_REPLICAS: i32 = 1;
pub const DEFAULT_WORKER_REPLICAS: i32 = 0;

/// Replica count used when a present role leaves `replicas` unset
pub fn default_replicas(replica_type: ReplicaType) -> i32 {
    match replica_type {
        ReplicaType::Launcher => DEFAULT_LAUNCHER_REPLICAS,
        ReplicaType::Worker => DEFAULT_WORKER_REPLICAS,
    }
}

/// Fill every unset field of `spec` in place.
///
/// Idempotent, and never adds a replica role that is not already present.
pub fn set_defaults(spec: &mut MPIJobSpec) {
    if spec.slots_per_worker.is_none() {
        debug!(slots_per_worker = DEFAULT_SLOTS_PER_WORKER, "Defaulting slotsPerWorker");
        spec.slots_per_worker = Some(DEFAULT_SLOTS_PER_WORKER);
    }

    if spec.clean_pod_policy.is_none() {
        debug!(clean_pod_policy = ?DEFAULT_CLEAN_POD_POLICY, "Defaulting cleanPodPolicy");
        spec.clean_pod_policy = Some(DEFAULT_CLEAN_POD_POLICY);
    }

    if spec.main_container.is_none() {
        debug!(main_container = MPIJOB_DEFAULT_CONTAINER_NAME, "Defaulting mainContainer");
        spec.main_container = Some(MPIJOB_DEFAULT_CONTAINER_NAME.to_string());
    }

    for (replica_type, replica_spec) in spec.mpi_replica_specs.iter_mut() {
        set_replica_defaults(*replica_type, replica_spec);
    }
}

/// Defaulted copy of `spec`; the caller's value is left as it was
pub fn defaulted(spec: &MPIJobSpec) -> MPIJobSpec {
    let mut copy = spec.clone();
    set_defaults(&mut copy);
    copy
}

fn set_replica_defaults(replica_type: ReplicaType, spec: &mut ReplicaSpec) {
    if spec.restart_policy.is_none() {
        debug!(%replica_type, restart_policy = ?MPIJOB_DEFAULT_RESTART_POLICY, "Defaulting restartPolicy");
        spec.restart_policy = Some(MPIJOB_DEFAULT_RESTART_POLICY);
    }

    if spec.replicas.is_none() {
        let replicas = default_replicas(replica_type);
        debug!(%replica_type, replicas, "Defaulting replicas");
        spec.replicas = Some(replicas);
    }
}
