//! Semantic models.
//!
//! A model is the result of compiling one source file (the megamodel also
//! owns a model of its own, with no source). The engine keeps the shape
//! generic: named elements with forward references that the resolve phase
//! replaces with element indices. Per-language semantics (inheritance,
//! conformance, evaluation) layer on top through the language hooks.

use smol_str::SmolStr;

use crate::base::{BoxId, SourceId};

/// A reference from one model element to another, by name until resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementRef {
    /// Forward reference recorded during the fill phase.
    Unresolved(SmolStr),
    /// Index of the target element within the same model.
    Resolved(usize),
}

impl ElementRef {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ElementRef::Resolved(_))
    }
}

/// One named element inside a model.
#[derive(Clone, Debug)]
pub struct ModelElement {
    pub name: SmolStr,
    /// Element kind in the owning language's vocabulary.
    pub kind: SmolStr,
    pub line: u32,
    pub references: Vec<ElementRef>,
}

/// The semantic result of compiling one file.
#[derive(Debug)]
pub struct ModelData {
    pub name: SmolStr,
    pub metamodel: SmolStr,
    /// Declared model kinds, from the file's declaration statement.
    pub kinds: Vec<SmolStr>,
    pub description: Option<String>,
    /// Back-reference to the compiled file; `None` for sourceless models.
    pub source: Option<SourceId>,
    pub issue_box: BoxId,
    pub elements: Vec<ModelElement>,
}

impl ModelData {
    pub fn new(name: impl Into<SmolStr>, metamodel: impl Into<SmolStr>, issue_box: BoxId) -> Self {
        Self {
            name: name.into(),
            metamodel: metamodel.into(),
            kinds: Vec::new(),
            description: None,
            source: None,
            issue_box,
            elements: Vec::new(),
        }
    }

    pub fn element(&self, name: &str) -> Option<&ModelElement> {
        self.elements.iter().find(|element| element.name == name)
    }

    /// Replace every `Unresolved` reference whose target is declared in this
    /// model with its element index. Returns the names that stayed
    /// unresolved, with the line of the referring element, for the language
    /// to report at its chosen severity.
    pub fn resolve_references(&mut self) -> Vec<(SmolStr, u32)> {
        let names: Vec<SmolStr> = self.elements.iter().map(|element| element.name.clone()).collect();
        let mut unresolved = Vec::new();
        for element in &mut self.elements {
            let line = element.line;
            for reference in &mut element.references {
                if let ElementRef::Unresolved(name) = reference {
                    match names.iter().position(|candidate| candidate == name) {
                        Some(index) => *reference = ElementRef::Resolved(index),
                        None => unresolved.push((name.clone(), line)),
                    }
                }
            }
        }
        unresolved
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.elements
            .iter()
            .all(|element| element.references.iter().all(ElementRef::is_resolved))
    }
}
