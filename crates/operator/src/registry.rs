//! Type registry for the kinds this crate serves
//!
//! Nothing registers itself on import. The hosting process builds one
//! [`TypeRegistry`] at startup and calls [`install`] on it.

use crate::crd::{MPIJob, MPIJobList};
use crate::error::RegistryError;
use kube::Resource;
use std::any::{TypeId, type_name};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Group, version and kind of a persisted type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeIdentity {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl TypeIdentity {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Identity of a statically typed kube resource
    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self::new(K::group(&()), K::version(&()), K::kind(&()))
    }

    /// Identity of the list type paired with this kind
    pub fn list(&self) -> Self {
        Self::new(&self.group, &self.version, format!("{}List", self.kind))
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    type_id: TypeId,
    type_name: &'static str,
}

/// Maps type identities to the Rust types that decode them.
///
/// Registering the same type twice is a no-op. Registering a different type
/// under a taken identity fails instead of replacing the first one.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: BTreeMap<TypeIdentity, Registration>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(true)` when the entry is new, `Ok(false)` when it was already there
    pub fn register<T: 'static>(&mut self, identity: TypeIdentity) -> Result<bool, RegistryError> {
        let attempted = Registration {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        };

        match self.entries.get(&identity) {
            Some(existing) if existing.type_id == attempted.type_id => {
                debug!(%identity, type_name = attempted.type_name, "Type already registered");
                Ok(false)
            }
            Some(existing) => Err(RegistryError::Conflict {
                identity: identity.to_string(),
                existing: existing.type_name,
                attempted: attempted.type_name,
            }),
            None => {
                info!(%identity, type_name = attempted.type_name, "Registered type");
                self.entries.insert(identity, attempted);
                Ok(true)
            }
        }
    }

    pub fn register_resource<K>(&mut self) -> Result<bool, RegistryError>
    where
        K: Resource<DynamicType = ()> + 'static,
    {
        self.register::<K>(TypeIdentity::of::<K>())
    }

    /// Rust type name registered for `identity`
    pub fn lookup(&self, identity: &TypeIdentity) -> Option<&'static str> {
        self.entries.get(identity).map(|r| r.type_name)
    }

    pub fn is_registered<T: 'static>(&self, identity: &TypeIdentity) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|r| r.type_id == TypeId::of::<T>())
    }

    pub fn identities(&self) -> impl Iterator<Item = &TypeIdentity> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Register `MPIJob` and `MPIJobList`
pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistryError> {
    let job = TypeIdentity::of::<MPIJob>();
    registry.register::<MPIJobList>(job.list())?;
    registry.register::<MPIJob>(job)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::MPIJOB_LIST_KIND;

    #[test]
    fn test_install_registers_job_and_list() {
        let mut registry = TypeRegistry::new();
        install(&mut registry).unwrap();

        let job = TypeIdentity::of::<MPIJob>();
        assert_eq!(registry.len(), 2);
        assert!(registry.is_registered::<MPIJob>(&job));
        assert!(registry.is_registered::<MPIJobList>(&job.list()));
        assert_eq!(job.list().kind, MPIJOB_LIST_KIND);
    }

    #[test]
    fn test_install_twice_is_a_noop() {
        let mut registry = TypeRegistry::new();
        install(&mut registry).unwrap();
        install(&mut registry).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_reports_new_entries() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_resource::<MPIJob>().unwrap());
        assert!(!registry.register_resource::<MPIJob>().unwrap());
    }

    #[test]
    fn test_conflicting_registration_fails() {
        let mut registry = TypeRegistry::new();
        let identity = TypeIdentity::of::<MPIJob>();
        registry.register::<MPIJob>(identity.clone()).unwrap();

        let err = registry.register::<String>(identity.clone()).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
        assert!(registry.is_registered::<MPIJob>(&identity));
        assert!(registry.lookup(&identity).unwrap().ends_with("MPIJob"));
    }

    #[test]
    fn test_identity_display() {
        let identity = TypeIdentity::of::<MPIJob>();
        assert_eq!(identity.to_string(), "kubeflow.org/v1, Kind=MPIJob");
        assert_eq!(TypeIdentity::new("", "v1", "Pod").api_version(), "v1");
    }
}
