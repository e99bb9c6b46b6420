//! # megamodel
//!
//! Cross-file, cross-language build engine for embedded modeling languages.
//!
//! A *megamodel* coordinates an open set of interdependent source files
//! written in different modeling languages: it discovers, loads, parses, and
//! semantically resolves each file, propagates diagnostics transitively along
//! the import graph, and compiles every physical file at most once no matter
//! how many other files import it.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! megamodel → metamodel registry, dependency graph, Megamodel context
//!   ↓
//! build     → AST surface, language hooks, models, source files, pipeline
//!   ↓
//! graph     → generic traversal (post-order, cycles, paths)
//!   ↓
//! issues    → severity levels, issues, parent-chained issue boxes
//!   ↓
//! base      → primitives (arena ids, Position, Span)
//! ```

// ============================================================================
// MODULES (dependency order: base → issues → graph → build → megamodel)
// ============================================================================

/// Foundation types: arena ids, Position, Span
pub mod base;

/// Diagnostics: severity levels, issues, parent-chained issue boxes
pub mod issues;

/// Generic graph traversal over a successor function
pub mod graph;

/// Build pipeline: AST surface, language hooks, models, source files
pub mod build;

/// Megamodel: metamodel registry, dependency graph, load entry points
pub mod megamodel;

// Re-export foundation types
pub use base::{BoxId, ModelId, Position, SourceId, Span};

// Re-export the items nearly every consumer needs
pub use build::{AnalysisLevel, Ast, Fatal, Language, ParseFailure};
pub use issues::{Issue, IssueLevel};
pub use megamodel::{Megamodel, Metamodel, MetamodelDependency, RegistryError};
