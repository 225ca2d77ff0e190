//! Admission pipeline tests
//!
//! Exercise decode → default → validate end to end on persisted documents.

use mpijob_operator::codec::{decode_json, decode_yaml, encode_json};
use mpijob_operator::crd::{CleanPodPolicy, ReplicaType, RestartPolicy};
use mpijob_operator::{ValidationErrorKind, admit, defaulted, validate};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

// ═══════════════════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════════════════

fn pod_template(containers: &[&str]) -> Value {
    let containers: Vec<Value> = containers
        .iter()
        .map(|name| json!({"name": name, "image": "mpioperator/mpi-pi"}))
        .collect();
    json!({"spec": {"containers": containers}})
}

fn document(spec: Value) -> String {
    json!({
        "apiVersion": "kubeflow.org/v1",
        "kind": "MPIJob",
        "metadata": {"name": "pi", "namespace": "training"},
        "spec": spec,
    })
    .to_string()
}

fn topology(launcher: Option<i32>, workers: Option<i32>) -> String {
    let mut replica_specs = serde_json::Map::new();
    if let Some(n) = launcher {
        replica_specs.insert(
            "Launcher".to_string(),
            json!({"replicas": n, "template": pod_template(&["mpi"])}),
        );
    }
    if let Some(n) = workers {
        replica_specs.insert(
            "Worker".to_string(),
            json!({"replicas": n, "template": pod_template(&["mpi"])}),
        );
    }
    document(json!({"mpiReplicaSpecs": replica_specs}))
}

#[fixture]
fn pi_manifest() -> &'static str {
    r#"
apiVersion: kubeflow.org/v1
kind: MPIJob
metadata:
  name: tensorflow-benchmarks
spec:
  slotsPerWorker: 4
  cleanPodPolicy: Running
  runPolicy:
    backoffLimit: 3
    ttlSecondsAfterFinished: 600
  mpiReplicaSpecs:
    Launcher:
      replicas: 1
      template:
        spec:
          containers:
            - name: mpi
              image: mpioperator/tensorflow-benchmarks
              command: ["mpirun", "python", "scripts/tf_cnn_benchmarks.py"]
    Worker:
      replicas: 2
      template:
        spec:
          containers:
            - name: mpi
              image: mpioperator/tensorflow-benchmarks
            - name: log-shipper
              image: fluent/fluent-bit
"#
}

// ═══════════════════════════════════════════════════════════════════════════════
// Topology
// ═══════════════════════════════════════════════════════════════════════════════

#[rstest]
#[case::launcher_and_workers(Some(1), Some(4))]
#[case::workers_only(None, Some(2))]
#[case::launcher_only(Some(1), None)]
#[case::launcher_with_idle_workers(Some(1), Some(0))]
fn test_valid_topologies(#[case] launcher: Option<i32>, #[case] workers: Option<i32>) {
    let job = decode_json(&topology(launcher, workers)).unwrap();
    assert!(admit(&job).is_ok());
}

#[rstest]
#[case::no_roles(None, None)]
#[case::two_launchers(Some(2), Some(4))]
#[case::zero_launchers(Some(0), Some(4))]
#[case::no_replicas(None, Some(0))]
#[case::negative_workers(Some(1), Some(-2))]
fn test_invalid_topologies(#[case] launcher: Option<i32>, #[case] workers: Option<i32>) {
    let job = decode_json(&topology(launcher, workers)).unwrap();
    let err = admit(&job).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::MissingReplicaRoles);
}

#[test]
fn test_launcher_cardinality_error_names_field() {
    let job = decode_json(&topology(Some(2), Some(4))).unwrap();
    let err = admit(&job).unwrap_err();
    assert_eq!(err.field, "spec.mpiReplicaSpecs[Launcher].replicas");
    assert!(err.to_string().contains("expected 1, got 2"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Field checks
// ═══════════════════════════════════════════════════════════════════════════════

#[rstest]
#[case(0)]
#[case(-1)]
fn test_invalid_slots_per_worker(#[case] slots: i32) {
    let doc = document(json!({
        "slotsPerWorker": slots,
        "mpiReplicaSpecs": {"Worker": {"replicas": 2, "template": pod_template(&["mpi"])}},
    }));
    let err = admit(&decode_json(&doc).unwrap()).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::InvalidSlotsPerWorker);
    assert_eq!(err.field, "spec.slotsPerWorker");
}

#[rstest]
#[case("Coordinator")]
#[case("PS")]
#[case("launcher")]
fn test_unknown_replica_role(#[case] role: &str) {
    let doc = document(json!({
        "mpiReplicaSpecs": {
            "Worker": {"replicas": 2, "template": pod_template(&["mpi"])},
            role: {"replicas": 1},
        },
    }));
    let err = decode_json(&doc).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::UnknownReplicaRole);
    assert_eq!(err.field, format!("spec.mpiReplicaSpecs[{role}]"));
}

#[test]
fn test_main_container_mismatch() {
    let doc = document(json!({
        "mainContainer": "mpi",
        "mpiReplicaSpecs": {"Worker": {"replicas": 2, "template": pod_template(&["worker"])}},
    }));
    let err = admit(&decode_json(&doc).unwrap()).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::MainContainerNotFound);
    assert_eq!(err.expected.as_deref(), Some("mpi"));
    assert_eq!(err.actual.as_deref(), Some("worker"));
}

#[test]
fn test_custom_main_container() {
    let doc = document(json!({
        "mainContainer": "trainer",
        "mpiReplicaSpecs": {
            "Launcher": {"replicas": 1, "template": pod_template(&["trainer"])},
            "Worker": {"replicas": 2, "template": pod_template(&["trainer", "sidecar"])},
        },
    }));
    assert!(admit(&decode_json(&doc).unwrap()).is_ok());
}

#[test]
fn test_malformed_document() {
    let err = decode_yaml("apiVersion: kubeflow.org/v1\nkind: MPIJob\nspec: [1, 2").unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::StructuralDecodeError);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Defaulting through the pipeline
// ═══════════════════════════════════════════════════════════════════════════════

#[rstest]
fn test_manifest_is_admitted(pi_manifest: &str) {
    let job = decode_yaml(pi_manifest).unwrap();
    let canonical = admit(&job).unwrap();

    assert_eq!(canonical.spec.slots_per_worker, Some(4));
    assert_eq!(canonical.spec.clean_pod_policy, Some(CleanPodPolicy::Running));
    assert_eq!(canonical.spec.main_container.as_deref(), Some("mpi"));
    assert_eq!(canonical.spec.total_worker_processes(), Some(8));
    assert_eq!(canonical.spec.run_policy, job.spec.run_policy);
    assert_eq!(canonical.spec.run_policy.backoff_limit, Some(3));
    for replica in canonical.spec.mpi_replica_specs.values() {
        assert_eq!(replica.restart_policy, Some(RestartPolicy::Never));
    }
}

#[rstest]
fn test_admission_does_not_touch_input(pi_manifest: &str) {
    let job = decode_yaml(pi_manifest).unwrap();
    let snapshot = job.clone();
    let _ = admit(&job).unwrap();
    assert_eq!(job, snapshot);
    assert!(job.spec.main_container.is_none());
}

#[test]
fn test_slots_default_only_when_unset() {
    let unset = decode_json(&topology(Some(1), Some(2))).unwrap();
    assert_eq!(defaulted(&unset.spec).slots_per_worker, Some(1));

    let doc = document(json!({
        "slotsPerWorker": 4,
        "mpiReplicaSpecs": {"Worker": {"replicas": 2, "template": pod_template(&["mpi"])}},
    }));
    let explicit = decode_json(&doc).unwrap();
    assert_eq!(defaulted(&explicit.spec).slots_per_worker, Some(4));
}

#[test]
fn test_defaulting_never_adds_roles() {
    let job = decode_json(&topology(None, Some(3))).unwrap();
    let spec = defaulted(&job.spec);
    assert!(spec.replica_spec(ReplicaType::Launcher).is_none());
    assert!(validate(&spec).is_ok());
}

#[rstest]
fn test_canonical_round_trip(pi_manifest: &str) {
    let canonical = admit(&decode_yaml(pi_manifest).unwrap()).unwrap();
    let decoded = decode_json(&encode_json(&canonical).unwrap()).unwrap();
    assert_eq!(decoded, canonical);
}
