//! The megamodel: process-wide coordination of metamodels, models, source
//! files, and the dependencies between them.
//!
//! Nothing here is a global. A [`Megamodel`] is an explicit context value;
//! tests create a fresh one each, and every build-pipeline call threads
//! through it.

mod context;
mod dependencies;
mod metamodel;
mod registry;

pub use context::Megamodel;
pub use dependencies::{DependencyGraph, ModelDependency, SourceFileDependency};
pub use metamodel::{Metamodel, MetamodelDependency};
pub use registry::{MetamodelRegistry, RegistryError};
