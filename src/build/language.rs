//! The per-language hook surface.
//!
//! One [`Language`] implementation exists per registered metamodel, attached
//! to the [`Megamodel`](crate::megamodel::Megamodel) under the metamodel id
//! after registration (attachment is late so language crates can reference
//! each other's metamodels without a circular initialization order). The
//! engine calls the hooks in pipeline order and never interprets language
//! semantics itself.

use smol_str::SmolStr;

use super::ast::Ast;
use super::model::ModelData;
use super::pipeline::Fatal;
use super::source::SourceFile;
use crate::base::{BoxId, ModelId, Position};
use crate::issues::{codes, Issue, IssueLevel, IssueStore};
use crate::megamodel::DependencyGraph;

/// A parse rejected by a language's grammar.
///
/// Converted by the pipeline into one localized Fatal; anything else a
/// parser does (panics, I/O) is a defect and propagates.
#[derive(Clone, Debug)]
pub struct ParseFailure {
    pub message: String,
    pub position: Position,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl From<ParseFailure> for Fatal {
    fn from(failure: ParseFailure) -> Self {
        Fatal::at(failure.message, codes::SYNTAX_ERROR, failure.position)
    }
}

/// Mutable view handed to the fill/resolve/finalize hooks.
///
/// `models` spans the whole arena so the finalize hook can perform
/// whole-graph closure computation over imported models; the fill and
/// resolve hooks are expected to touch only their own model.
pub struct ModelContext<'a> {
    pub file: &'a SourceFile,
    pub ast: &'a Ast,
    pub model_id: ModelId,
    pub models: &'a mut [ModelData],
    pub issues: &'a mut IssueStore,
    pub dependencies: &'a DependencyGraph,
}

impl ModelContext<'_> {
    pub fn model(&mut self) -> &mut ModelData {
        &mut self.models[self.model_id.index()]
    }

    pub fn model_ref(&self) -> &ModelData {
        &self.models[self.model_id.index()]
    }

    /// Raise an advisory issue on the model's box.
    ///
    /// `line` of `None` raises unlocalized; otherwise the position is
    /// clamped into the file's line range. Fatal outcomes go through the
    /// phase's `Result` instead, so the pipeline can stop the file.
    pub fn raise(
        &mut self,
        level: IssueLevel,
        message: impl Into<SmolStr>,
        code: impl Into<SmolStr>,
        line: Option<u32>,
    ) {
        let position = match line {
            Some(line) => self.file.clamp(Position::new(line, 0)),
            None => Position::unlocalized(),
        };
        let target = self.model_ref().issue_box;
        self.issues
            .raise(target, Issue::new(level, message, code, position));
    }
}

/// Per-metamodel behavior: grammar, model factory, and the three semantic
/// phases. `resolve` and `finalize` default to no-ops; overrides carry the
/// whole phase.
pub trait Language {
    /// Produce the engine-visible AST for a file's raw lines.
    fn parse(&self, file: &SourceFile) -> Result<Ast, ParseFailure>;

    /// Create the empty model a file of this language compiles into.
    fn new_model(&self, name: SmolStr, issue_box: BoxId) -> ModelData;

    /// Convert AST body nodes into model elements. A pure transform: no
    /// lookups outside the file's own AST.
    fn fill_model(&self, context: &mut ModelContext<'_>) -> Result<(), Fatal>;

    /// Replace forward-reference placeholders with real targets.
    fn resolve(&self, context: &mut ModelContext<'_>) -> Result<(), Fatal> {
        let _ = context;
        Ok(())
    }

    /// Whole-graph closure computation, run only when no earlier phase
    /// raised a Fatal for this file.
    fn finalize(&self, context: &mut ModelContext<'_>) -> Result<(), Fatal> {
        let _ = context;
        Ok(())
    }
}
