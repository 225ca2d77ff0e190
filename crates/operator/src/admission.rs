//! Admission pipeline: copy, default, validate
//!
//! The caller's MPIJob is never modified; the canonical descriptor is a new
//! value. Status is carried over exactly as it was.

use crate::crd::MPIJob;
use crate::defaults::set_defaults;
use crate::error::ValidationError;
use crate::validation::{validate, validate_all};
use kube::ResourceExt;
use tracing::{debug, info};

/// Canonical copy of `job`, or the first violated invariant
pub fn admit(job: &MPIJob) -> Result<MPIJob, ValidationError> {
    let canonical = defaulted_job(job);
    validate(&canonical.spec)?;
    admitted(&canonical);
    Ok(canonical)
}

/// Like [`admit`] but reports every violated invariant
pub fn admit_all(job: &MPIJob) -> Result<MPIJob, Vec<ValidationError>> {
    let canonical = defaulted_job(job);
    let errors = validate_all(&canonical.spec);
    if !errors.is_empty() {
        return Err(errors);
    }
    admitted(&canonical);
    Ok(canonical)
}

fn defaulted_job(job: &MPIJob) -> MPIJob {
    let mut canonical = job.clone();
    set_defaults(&mut canonical.spec);
    debug!(name = %job.name_any(), "Defaulted MPIJob spec");
    canonical
}

fn admitted(job: &MPIJob) {
    let namespace = job.namespace().unwrap_or_default();
    info!(
        name = %job.name_any(),
        namespace = %namespace,
        slots_per_worker = ?job.spec.slots_per_worker,
        total_processes = ?job.spec.total_worker_processes(),
        "MPIJob admitted"
    );
}
