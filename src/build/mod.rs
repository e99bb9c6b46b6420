//! Build pipeline — per-file compilation from raw text to a resolved model.
//!
//! The engine drives a fixed sequence of phases (parse → discover deps →
//! fill model → resolve → finalize) and delegates everything
//! language-specific through the [`Language`] trait. A [`Fatal`] returned by
//! any phase stops the file's build; the file stays registered with whatever
//! phases completed.

pub mod ast;
pub mod language;
pub mod model;
mod pipeline;
pub mod source;

pub use ast::{Ast, BodyNode, Declaration, ImportStatement};
pub use language::{Language, ModelContext, ParseFailure};
pub use model::{ElementRef, ModelData, ModelElement};
pub use pipeline::{AnalysisLevel, Fatal, PhaseProgress};
pub use source::{ImportBox, SourceEntry, SourceFile, SourceImport, SourceRegistry, SourceState};
