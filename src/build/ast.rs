//! The engine-visible surface of a parsed file.
//!
//! Concrete grammars live with each language; what the engine needs from a
//! parse is small and common to every language: the file's declaration
//! statement, its import statements, and an opaque list of body nodes the
//! language's `fill_model` phase consumes. Languages build an [`Ast`] from
//! whatever parsing machinery they use.

use smol_str::SmolStr;

use crate::base::{Position, Span};

/// Parsed contents of one source file.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    /// The file's declaration statement, when present.
    pub declaration: Option<Declaration>,
    /// Import statements in source order.
    pub imports: Vec<ImportStatement>,
    /// Remaining statements, left for the language's fill phase.
    pub body: Vec<BodyNode>,
}

/// The declaration statement naming the file's model.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: SmolStr,
    pub kinds: Vec<SmolStr>,
    pub description: Option<String>,
    pub position: Position,
}

/// One `import <metamodel> model from "<path>"` statement.
#[derive(Clone, Debug)]
pub struct ImportStatement {
    /// Metamodel id of the imported language (e.g. "gl").
    pub metamodel: SmolStr,
    /// Target path exactly as written, resolved against the importing
    /// file's directory during dependency discovery.
    pub target: String,
    pub position: Position,
}

/// An opaque statement the engine carries but does not interpret.
#[derive(Clone, Debug)]
pub struct BodyNode {
    /// Leading keyword, used by languages to dispatch.
    pub keyword: SmolStr,
    /// Statement text after the keyword.
    pub text: String,
    /// Source range of the whole statement, keyword included.
    pub span: Span,
}

impl Ast {
    pub fn is_empty(&self) -> bool {
        self.declaration.is_none() && self.imports.is_empty() && self.body.is_empty()
    }

    pub fn position(node: &BodyNode) -> Position {
        node.span.start
    }

    pub fn end_position(node: &BodyNode) -> Position {
        node.span.end
    }

    /// The body node whose span contains `position`, if any.
    pub fn node_at(&self, position: Position) -> Option<&BodyNode> {
        self.body.iter().find(|node| node.span.contains(position))
    }
}
