//! Metamodel descriptors and declared cross-language dependency rules.

use smol_str::SmolStr;

/// Descriptor for one embeddable modeling language.
///
/// Created once per language and immutable afterwards. The language's
/// behavior (grammar, factories) is attached to the megamodel separately,
/// under the same id, after registration.
#[derive(Clone, Debug)]
pub struct Metamodel {
    /// Short id used in import statements (e.g. "cl").
    pub id: SmolStr,
    /// Human-readable name (e.g. "class model").
    pub label: SmolStr,
    /// File extension without the dot (e.g. "cls").
    pub extension: SmolStr,
    /// Model kinds files of this language may declare.
    pub kinds: Vec<SmolStr>,
    /// When true, a file may import at most one model of this language.
    pub uniqueness: bool,
}

impl Metamodel {
    pub fn new(
        id: impl Into<SmolStr>,
        label: impl Into<SmolStr>,
        extension: impl Into<SmolStr>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            extension: extension.into(),
            kinds: Vec::new(),
            uniqueness: false,
        }
    }

    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uniqueness(mut self, uniqueness: bool) -> Self {
        self.uniqueness = uniqueness;
        self
    }
}

/// A declared rule that language `source` may import language `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetamodelDependency {
    pub source: SmolStr,
    pub target: SmolStr,
    /// When false, every file of `source` must carry at least one import
    /// of `target`; the per-language checkers enforce it.
    pub optional: bool,
    /// When true, a file of `source` may import several `target` models.
    pub multiple: bool,
}

impl MetamodelDependency {
    pub fn new(source: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            optional: true,
            multiple: true,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }
}
