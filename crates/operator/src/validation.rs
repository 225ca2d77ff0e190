//! Validation for MPIJob specs
//!
//! Checks run in a fixed order and `validate` stops at the first violation:
//!
//! 1. replica topology (at least one role, one launcher, non-negative counts)
//! 2. `slotsPerWorker`
//! 3. `mainContainer` present in every replica pod template
//!
//! Unknown role keys never reach this point: [`crate::crd::ReplicaType`] is a
//! closed enum and unknown keys are rejected when a document is decoded.
//!
//! Validation expects a defaulted spec. Unset replica counts are read as the
//! role defaults so a raw spec yields the same verdict as its defaulted form.

use crate::crd::{MPIJobSpec, ReplicaType};
use crate::defaults::default_replicas;
use crate::error::{ValidationError, ValidationErrorKind};
use std::iter;
use tracing::warn;

const REPLICA_SPECS_PATH: &str = "spec.mpiReplicaSpecs";

/// First violated invariant of `spec`, if any
pub fn validate(spec: &MPIJobSpec) -> Result<(), ValidationError> {
    match violations(spec).next() {
        Some(err) => {
            warn!(kind = %err.kind, field = %err.field, message = %err.message, "MPIJob spec rejected");
            Err(err)
        }
        None => Ok(()),
    }
}

/// Every violated invariant of `spec`, in check order
pub fn validate_all(spec: &MPIJobSpec) -> Vec<ValidationError> {
    let errors: Vec<_> = violations(spec).collect();
    for err in &errors {
        warn!(kind = %err.kind, field = %err.field, message = %err.message, "MPIJob spec rejected");
    }
    errors
}

fn violations(spec: &MPIJobSpec) -> impl Iterator<Item = ValidationError> + '_ {
    iter::once_with(move || check_replica_topology(spec))
        .flatten()
        .chain(iter::once_with(move || check_slots_per_worker(spec)).flatten())
        .chain(iter::once_with(move || check_main_container(spec)).flatten())
}

fn replicas_field(replica_type: ReplicaType) -> String {
    format!("{REPLICA_SPECS_PATH}[{replica_type}].replicas")
}

fn check_replica_topology(spec: &MPIJobSpec) -> Vec<ValidationError> {
    if spec.mpi_replica_specs.is_empty() {
        return vec![
            ValidationError::new(
                ValidationErrorKind::MissingReplicaRoles,
                REPLICA_SPECS_PATH,
                "at least one replica role is required",
            )
            .with_expected("Launcher and/or Worker"),
        ];
    }

    let mut errors = Vec::new();
    let mut requested = 0;

    for (replica_type, replica_spec) in &spec.mpi_replica_specs {
        let replicas = replica_spec
            .replicas
            .unwrap_or_else(|| default_replicas(*replica_type));

        if replicas < 0 {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::MissingReplicaRoles,
                    replicas_field(*replica_type),
                    format!("{replica_type} replica count must not be negative"),
                )
                .with_expected(">= 0")
                .with_actual(replicas.to_string()),
            );
            continue;
        }

        if *replica_type == ReplicaType::Launcher && replicas != 1 {
            errors.push(
                ValidationError::new(
                    ValidationErrorKind::MissingReplicaRoles,
                    replicas_field(ReplicaType::Launcher),
                    "an MPIJob has exactly one launcher",
                )
                .with_expected("1")
                .with_actual(replicas.to_string()),
            );
        }

        requested += replicas.min(1);
    }

    if errors.is_empty() && requested == 0 {
        errors.push(
            ValidationError::new(
                ValidationErrorKind::MissingReplicaRoles,
                REPLICA_SPECS_PATH,
                "at least one replica role must request one or more replicas",
            )
            .with_expected(">= 1 replica")
            .with_actual("0"),
        );
    }

    errors
}

fn check_slots_per_worker(spec: &MPIJobSpec) -> Option<ValidationError> {
    match spec.slots_per_worker {
        Some(slots) if slots < 1 => Some(
            ValidationError::new(
                ValidationErrorKind::InvalidSlotsPerWorker,
                "spec.slotsPerWorker",
                "slotsPerWorker must be a positive integer",
            )
            .with_expected(">= 1")
            .with_actual(slots.to_string()),
        ),
        _ => None,
    }
}

fn check_main_container(spec: &MPIJobSpec) -> Vec<ValidationError> {
    let main_container = spec.effective_main_container();

    spec.mpi_replica_specs
        .iter()
        .filter(|(_, replica_spec)| !replica_spec.has_container(main_container))
        .map(|(replica_type, replica_spec)| {
            let declared = replica_spec.container_names();
            let actual = if declared.is_empty() {
                "no containers".to_string()
            } else {
                declared.join(", ")
            };
            ValidationError::new(
                ValidationErrorKind::MainContainerNotFound,
                format!("{REPLICA_SPECS_PATH}[{replica_type}].template.spec.containers"),
                format!("main container {main_container:?} is not declared in the {replica_type} pod template"),
            )
            .with_expected(main_container)
            .with_actual(actual)
        })
        .collect()
}
