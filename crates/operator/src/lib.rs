//! MPIJob Operator API
//!
//! The `MPIJob` custom resource (`kubeflow.org/v1`) together with the
//! defaulting and validation a controller runs before acting on it. A raw
//! descriptor goes through [`admission::admit`], which defaults a copy and
//! validates it, and comes out as the canonical descriptor the reconciliation
//! loop consumes.

pub mod admission;
pub mod codec;
pub mod crd;
pub mod defaults;
pub mod error;
pub mod registry;
pub mod validation;

pub use admission::{admit, admit_all};
pub use crd::{MPIJob, MPIJobList, MPIJobSpec};
pub use defaults::{defaulted, set_defaults};
pub use error::{OperatorError, RegistryError, ValidationError, ValidationErrorKind};
pub use registry::{TypeIdentity, TypeRegistry};
pub use validation::{validate, validate_all};
