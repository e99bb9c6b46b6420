//! Model-level and file-level dependency relations.
//!
//! File-level dependencies come from actual import statements, one edge per
//! statement. Each file-level edge implies a model-level edge; model-level
//! registration is idempotent so diamond-shaped file imports never produce
//! duplicate model edges. The metamodel-level relation (which language may
//! import which) lives with the declarations in the
//! [`MetamodelRegistry`](super::MetamodelRegistry).

use smol_str::SmolStr;

use crate::base::{ModelId, Position, SourceId};
use crate::graph::post_order;

/// A dependency between two models, implied by at least one import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelDependency {
    pub source: ModelId,
    pub target: ModelId,
    /// Metamodel id the first underlying import named.
    pub metamodel: SmolStr,
}

/// A dependency between two source files, one per import statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFileDependency {
    pub source: SourceId,
    pub target: SourceId,
    pub metamodel: SmolStr,
    /// Position of the import statement in the source file.
    pub position: Position,
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    model_dependencies: Vec<ModelDependency>,
    source_dependencies: Vec<SourceFileDependency>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // FILE LEVEL
    // ========================================================================

    pub fn add_source_dependency(
        &mut self,
        source: SourceId,
        target: SourceId,
        metamodel: &SmolStr,
        position: Position,
    ) {
        tracing::trace!(%source, %target, %metamodel, "file dependency");
        self.source_dependencies.push(SourceFileDependency {
            source,
            target,
            metamodel: metamodel.clone(),
            position,
        });
    }

    /// File-level dependencies, optionally filtered by either endpoint.
    pub fn source_dependencies(
        &self,
        source: Option<SourceId>,
        target: Option<SourceId>,
    ) -> Vec<&SourceFileDependency> {
        self.source_dependencies
            .iter()
            .filter(|dependency| {
                source.is_none_or(|wanted| dependency.source == wanted)
                    && target.is_none_or(|wanted| dependency.target == wanted)
            })
            .collect()
    }

    /// The first file-level dependency for an ordered pair, if any.
    pub fn source_dependency(
        &self,
        source: SourceId,
        target: SourceId,
    ) -> Option<&SourceFileDependency> {
        self.source_dependencies
            .iter()
            .find(|dependency| dependency.source == source && dependency.target == target)
    }

    pub fn outgoing_sources(&self, source: SourceId) -> Vec<&SourceFileDependency> {
        self.source_dependencies(Some(source), None)
    }

    pub fn incoming_sources(&self, target: SourceId) -> Vec<&SourceFileDependency> {
        self.source_dependencies(None, Some(target))
    }

    // ========================================================================
    // MODEL LEVEL
    // ========================================================================

    /// Register the model-level edge implied by an import, reusing an
    /// existing edge for the same (source, target) pair.
    pub fn register_model_dependency(
        &mut self,
        source: ModelId,
        target: ModelId,
        metamodel: &SmolStr,
    ) -> &ModelDependency {
        let existing = self
            .model_dependencies
            .iter()
            .position(|dependency| dependency.source == source && dependency.target == target);
        let index = match existing {
            Some(index) => index,
            None => {
                tracing::trace!(%source, %target, "model dependency");
                self.model_dependencies.push(ModelDependency {
                    source,
                    target,
                    metamodel: metamodel.clone(),
                });
                self.model_dependencies.len() - 1
            }
        };
        &self.model_dependencies[index]
    }

    pub fn model_dependencies(
        &self,
        source: Option<ModelId>,
        target: Option<ModelId>,
    ) -> Vec<&ModelDependency> {
        self.model_dependencies
            .iter()
            .filter(|dependency| {
                source.is_none_or(|wanted| dependency.source == wanted)
                    && target.is_none_or(|wanted| dependency.target == wanted)
            })
            .collect()
    }

    pub fn model_dependency(&self, source: ModelId, target: ModelId) -> Option<&ModelDependency> {
        self.model_dependencies
            .iter()
            .find(|dependency| dependency.source == source && dependency.target == target)
    }

    pub fn outgoing_models(&self, source: ModelId) -> Vec<&ModelDependency> {
        self.model_dependencies(Some(source), None)
    }

    pub fn incoming_models(&self, target: ModelId) -> Vec<&ModelDependency> {
        self.model_dependencies(None, Some(target))
    }

    // ========================================================================
    // ORDERING
    // ========================================================================

    /// Dependency-first ordering of everything reachable from `roots` along
    /// the imports relation: each file appears once, after every file it
    /// imports, regardless of root order.
    pub fn source_file_list(&self, roots: impl IntoIterator<Item = SourceId>) -> Vec<SourceId> {
        post_order(roots, |file| {
            self.outgoing_sources(*file)
                .into_iter()
                .map(|dependency| dependency.target)
                .collect::<Vec<_>>()
        })
    }
}
