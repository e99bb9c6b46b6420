//! The metamodel registry: id, label, and extension lookup, plus the
//! declared cross-language dependency rules.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::metamodel::{Metamodel, MetamodelDependency};

/// Registry and declaration errors.
///
/// All of these signal a defect in the language configuration, not a
/// problem with a user's file; callers treat them as non-recoverable.
///
/// `Display` and `Error` are implemented by hand: several variants carry a
/// field named `source` that holds a metamodel id, which `thiserror` would
/// otherwise infer as the error cause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    UnknownMetamodel {
        what: &'static str,
        key: SmolStr,
    },

    DuplicateMetamodel {
        id: SmolStr,
    },

    UnknownDependencyEndpoint {
        id: SmolStr,
    },

    InvalidDependency {
        source: SmolStr,
        target: SmolStr,
    },

    AmbiguousDependency {
        source: SmolStr,
        target: SmolStr,
        count: usize,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMetamodel { what, key } => {
                write!(f, "no metamodel registered for {what} '{key}'")
            }
            Self::DuplicateMetamodel { id } => {
                write!(f, "metamodel '{id}' conflicts with an existing registration")
            }
            Self::UnknownDependencyEndpoint { id } => {
                write!(f, "metamodel dependency endpoint '{id}' is not registered")
            }
            Self::InvalidDependency { source, target } => {
                write!(f, "no metamodel dependency declared from '{source}' to '{target}'")
            }
            Self::AmbiguousDependency {
                source,
                target,
                count,
            } => {
                write!(
                    f,
                    "{count} metamodel dependencies declared from '{source}' to '{target}'"
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// All registered metamodels, with id/label/extension maps kept in sync.
#[derive(Debug, Default)]
pub struct MetamodelRegistry {
    metamodels: IndexMap<SmolStr, Metamodel>,
    by_label: FxHashMap<SmolStr, SmolStr>,
    by_extension: FxHashMap<SmolStr, SmolStr>,
    dependencies: Vec<MetamodelDependency>,
}

impl MetamodelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metamodel under its id, label, and extension.
    pub fn register(&mut self, metamodel: Metamodel) -> Result<(), RegistryError> {
        let clash = self.metamodels.contains_key(&metamodel.id)
            || self.by_label.contains_key(&metamodel.label)
            || self.by_extension.contains_key(&metamodel.extension);
        if clash {
            return Err(RegistryError::DuplicateMetamodel {
                id: metamodel.id.clone(),
            });
        }
        tracing::debug!(id = %metamodel.id, extension = %metamodel.extension, "register metamodel");
        self.by_label
            .insert(metamodel.label.clone(), metamodel.id.clone());
        self.by_extension
            .insert(metamodel.extension.clone(), metamodel.id.clone());
        self.metamodels.insert(metamodel.id.clone(), metamodel);
        Ok(())
    }

    pub fn lookup_id(&self, id: &str) -> Result<&Metamodel, RegistryError> {
        self.metamodels
            .get(id)
            .ok_or_else(|| RegistryError::UnknownMetamodel {
                what: "id",
                key: id.into(),
            })
    }

    pub fn lookup_label(&self, label: &str) -> Result<&Metamodel, RegistryError> {
        self.by_label
            .get(label)
            .and_then(|id| self.metamodels.get(id))
            .ok_or_else(|| RegistryError::UnknownMetamodel {
                what: "label",
                key: label.into(),
            })
    }

    pub fn lookup_extension(&self, extension: &str) -> Result<&Metamodel, RegistryError> {
        self.by_extension
            .get(extension)
            .and_then(|id| self.metamodels.get(id))
            .ok_or_else(|| RegistryError::UnknownMetamodel {
                what: "extension",
                key: extension.into(),
            })
    }

    /// Registered metamodels in registration order.
    pub fn metamodels(&self) -> impl Iterator<Item = &Metamodel> {
        self.metamodels.values()
    }

    /// Registered file extensions, in registration order.
    pub fn extensions(&self) -> Vec<SmolStr> {
        self.metamodels
            .values()
            .map(|metamodel| metamodel.extension.clone())
            .collect()
    }

    /// Declare that `dependency.source` files may import `dependency.target`
    /// models. Both endpoints must already be registered.
    ///
    /// A second declaration for the same ordered pair is accepted here and
    /// reported as [`RegistryError::AmbiguousDependency`] when queried; the
    /// defect belongs to whoever declared it, and surfacing it at the query
    /// site names the file that tripped over it.
    pub fn declare_dependency(
        &mut self,
        dependency: MetamodelDependency,
    ) -> Result<(), RegistryError> {
        for endpoint in [&dependency.source, &dependency.target] {
            if !self.metamodels.contains_key(endpoint) {
                return Err(RegistryError::UnknownDependencyEndpoint {
                    id: endpoint.clone(),
                });
            }
        }
        if self.dependency(&dependency.source, &dependency.target).is_ok() {
            tracing::warn!(
                source = %dependency.source,
                target = %dependency.target,
                "duplicate metamodel dependency declaration"
            );
        }
        self.dependencies.push(dependency);
        Ok(())
    }

    /// The single declared dependency from `source` to `target`.
    pub fn dependency(
        &self,
        source: &str,
        target: &str,
    ) -> Result<&MetamodelDependency, RegistryError> {
        let matches: Vec<&MetamodelDependency> = self
            .dependencies
            .iter()
            .filter(|dependency| dependency.source == source && dependency.target == target)
            .collect();
        match matches.as_slice() {
            [] => Err(RegistryError::InvalidDependency {
                source: source.into(),
                target: target.into(),
            }),
            [single] => Ok(single),
            many => Err(RegistryError::AmbiguousDependency {
                source: source.into(),
                target: target.into(),
                count: many.len(),
            }),
        }
    }

    /// Declared dependencies, optionally filtered by either endpoint.
    pub fn dependencies(
        &self,
        source: Option<&str>,
        target: Option<&str>,
    ) -> Vec<&MetamodelDependency> {
        self.dependencies
            .iter()
            .filter(|dependency| {
                source.is_none_or(|wanted| dependency.source == wanted)
                    && target.is_none_or(|wanted| dependency.target == wanted)
            })
            .collect()
    }

    pub fn outgoing(&self, source: &str) -> Vec<&MetamodelDependency> {
        self.dependencies(Some(source), None)
    }

    pub fn incoming(&self, target: &str) -> Vec<&MetamodelDependency> {
        self.dependencies(None, Some(target))
    }
}
