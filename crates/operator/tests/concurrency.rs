//! Defaulting and validation shared across threads

use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use mpijob_operator::crd::{ReplicaSpec, ReplicaType};
use mpijob_operator::{
    MPIJob, MPIJobSpec, TypeRegistry, ValidationError, ValidationErrorKind, admit, defaulted,
    set_defaults, validate,
};
use std::thread;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_engine_types_are_send_and_sync() {
    assert_send_sync::<MPIJob>();
    assert_send_sync::<MPIJobSpec>();
    assert_send_sync::<ValidationError>();
    assert_send_sync::<TypeRegistry>();
}

fn replica(replicas: i32) -> ReplicaSpec {
    ReplicaSpec::new(replicas).with_template(PodTemplateSpec {
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "mpi".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn spec(launchers: i32, workers: i32) -> MPIJobSpec {
    MPIJobSpec::default()
        .with_replica(ReplicaType::Launcher, replica(launchers))
        .with_replica(ReplicaType::Worker, replica(workers))
}

#[test]
fn test_shared_spec_is_defaulted_from_many_threads() {
    let shared = spec(1, 4);
    let expected = defaulted(&shared);

    let results: Vec<MPIJobSpec> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| defaulted(&shared))).collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(results.iter().all(|result| *result == expected));
    assert!(shared.slots_per_worker.is_none());
}

#[test]
fn test_clones_are_defaulted_in_place_in_parallel() {
    let mut clones: Vec<MPIJobSpec> = (0..8).map(|i| spec(1, i)).collect();

    thread::scope(|scope| {
        for clone in clones.iter_mut() {
            scope.spawn(move || set_defaults(clone));
        }
    });

    for (workers, clone) in clones.iter().enumerate() {
        assert_eq!(clone.slots_per_worker, Some(1));
        assert_eq!(clone.replicas_for(ReplicaType::Worker), Some(workers as i32));
    }
}

#[test]
fn test_verdicts_match_across_threads() {
    let specs = [spec(1, 2), spec(2, 2), spec(1, 0)];

    let verdicts: Vec<Vec<Option<ValidationErrorKind>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    specs
                        .iter()
                        .map(|spec| validate(&defaulted(spec)).err().map(|e| e.kind))
                        .collect()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let expected = vec![None, Some(ValidationErrorKind::MissingReplicaRoles), None];
    assert!(verdicts.iter().all(|verdict| *verdict == expected));
}

#[test]
fn test_admission_from_many_threads() {
    let job = MPIJob::new("pi", spec(2, 4));

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let err = admit(&job).unwrap_err();
                assert_eq!(err.kind, ValidationErrorKind::MissingReplicaRoles);
            });
        }
    });

    assert!(job.spec.slots_per_worker.is_none());
}
