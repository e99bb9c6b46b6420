//! Shared fixtures: two small line-oriented languages that exercise the
//! whole pipeline.
//!
//! `gl` ("glossary", extension `gls`) has no dependencies. `cl` ("class
//! model", extension `cls`) may import `gl` models and other `cl` models.
//! Statement shapes:
//!
//! ```text
//! glossary model Terms
//! entry velocity : "speed of something"
//!
//! class model Demo (system)
//! import gl model from "terms.gls"
//! class Person
//! class Employee extends Person
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use megamodel::base::{BoxId, Position, Span};
use megamodel::build::{
    Ast, BodyNode, Declaration, ElementRef, Fatal, ImportStatement, Language, ModelContext,
    ModelData, ModelElement, ParseFailure, SourceFile,
};
use megamodel::issues::{codes, IssueLevel};
use megamodel::megamodel::{Megamodel, Metamodel, MetamodelDependency};

/// Line-oriented parse shared by both toy languages.
///
/// `decl_keyword` introduces the declaration statement; every other
/// non-comment line must be an import or start with one of `body_keywords`.
fn parse_lines(
    file: &SourceFile,
    decl_keyword: &str,
    body_keywords: &[&str],
) -> Result<Ast, ParseFailure> {
    let mut ast = Ast::default();
    for (index, raw) in file.lines().iter().enumerate() {
        let line = (index + 1) as u32;
        let text = raw.trim_start();
        let column = (raw.len() - text.len()) as u32;
        let text = text.trim_end();
        if text.is_empty() || text.starts_with("//") {
            continue;
        }
        let position = Position::new(line, column);

        if let Some(rest) = text.strip_prefix(&format!("{decl_keyword} model ")) {
            ast.declaration = Some(parse_declaration(rest, position));
        } else if text.starts_with("import ") {
            ast.imports.push(parse_import(text, position)?);
        } else {
            let (keyword, rest) = text.split_once(' ').unwrap_or((text, ""));
            if !body_keywords.contains(&keyword) {
                return Err(ParseFailure::new(
                    format!("unexpected statement '{keyword}'"),
                    position,
                ));
            }
            let end = Position::new(line, column + text.chars().count() as u32);
            ast.body.push(BodyNode {
                keyword: keyword.into(),
                text: rest.trim().to_string(),
                span: Span::new(position, end),
            });
        }
    }
    Ok(ast)
}

fn parse_declaration(rest: &str, position: Position) -> Declaration {
    let (name, kinds) = match rest.split_once('(') {
        Some((name, kinds)) => {
            let kinds = kinds
                .trim_end_matches(')')
                .split(',')
                .map(|kind| SmolStr::new(kind.trim()))
                .filter(|kind| !kind.is_empty())
                .collect();
            (name.trim(), kinds)
        }
        None => (rest.trim(), Vec::new()),
    };
    Declaration {
        name: name.into(),
        kinds,
        description: None,
        position,
    }
}

fn parse_import(text: &str, position: Position) -> Result<ImportStatement, ParseFailure> {
    // import <metamodel> model from "<path>"
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        ["import", metamodel, "model", "from", quoted]
            if quoted.starts_with('"') && quoted.ends_with('"') && quoted.len() >= 2 =>
        {
            Ok(ImportStatement {
                metamodel: SmolStr::new(*metamodel),
                target: quoted[1..quoted.len() - 1].to_string(),
                position,
            })
        }
        _ => Err(ParseFailure::new(
            "malformed import statement".to_string(),
            position,
        )),
    }
}

/// The `gl` glossary language.
pub struct Glossary;

impl Language for Glossary {
    fn parse(&self, file: &SourceFile) -> Result<Ast, ParseFailure> {
        parse_lines(file, "glossary", &["entry"])
    }

    fn new_model(&self, name: SmolStr, issue_box: BoxId) -> ModelData {
        ModelData::new(name, "gl", issue_box)
    }

    fn fill_model(&self, context: &mut ModelContext<'_>) -> Result<(), Fatal> {
        let entries: Vec<(SmolStr, u32, bool)> = context
            .ast
            .body
            .iter()
            .map(|node| {
                let (name, described) = match node.text.split_once(':') {
                    Some((name, description)) => {
                        (name.trim(), description.trim().starts_with('"'))
                    }
                    None => (node.text.as_str(), false),
                };
                (SmolStr::new(name), node.span.start.line, described)
            })
            .collect();
        for (name, line, described) in entries {
            if !described {
                context.raise(
                    IssueLevel::Error,
                    format!("entry '{name}' has no description"),
                    "gl.entry.missing-description",
                    Some(line),
                );
            }
            context.model().elements.push(ModelElement {
                name,
                kind: "entry".into(),
                line,
                references: Vec::new(),
            });
        }
        Ok(())
    }
}

/// The `cl` class-model language.
pub struct ClassModel;

impl Language for ClassModel {
    fn parse(&self, file: &SourceFile) -> Result<Ast, ParseFailure> {
        parse_lines(file, "class", &["class"])
    }

    fn new_model(&self, name: SmolStr, issue_box: BoxId) -> ModelData {
        ModelData::new(name, "cl", issue_box)
    }

    fn fill_model(&self, context: &mut ModelContext<'_>) -> Result<(), Fatal> {
        let classes: Vec<(SmolStr, u32, Option<SmolStr>)> = context
            .ast
            .body
            .iter()
            .map(|node| {
                let (name, superclass) = match node.text.split_once(" extends ") {
                    Some((name, superclass)) => {
                        (name.trim(), Some(SmolStr::new(superclass.trim())))
                    }
                    None => (node.text.as_str(), None),
                };
                (SmolStr::new(name), node.span.start.line, superclass)
            })
            .collect();
        for (name, line, superclass) in classes {
            let references = superclass
                .into_iter()
                .map(ElementRef::Unresolved)
                .collect();
            context.model().elements.push(ModelElement {
                name,
                kind: "class".into(),
                line,
                references,
            });
        }
        Ok(())
    }

    fn resolve(&self, context: &mut ModelContext<'_>) -> Result<(), Fatal> {
        let unresolved = context.model().resolve_references();
        for (name, line) in unresolved {
            context.raise(
                IssueLevel::Error,
                format!("unknown superclass '{name}'"),
                codes::UNRESOLVED_SYMBOL,
                Some(line),
            );
        }
        Ok(())
    }

    fn finalize(&self, context: &mut ModelContext<'_>) -> Result<(), Fatal> {
        // Whole-graph closure: look across the model-level dependencies.
        let empty_imports: Vec<SmolStr> = context
            .dependencies
            .outgoing_models(context.model_id)
            .iter()
            .filter(|dependency| dependency.metamodel == "gl")
            .filter(|dependency| context.models[dependency.target.index()].elements.is_empty())
            .map(|dependency| context.models[dependency.target.index()].name.clone())
            .collect();
        for name in empty_imports {
            context.raise(
                IssueLevel::Warning,
                format!("imported glossary '{name}' is empty"),
                "cl.import.empty-glossary",
                None,
            );
        }
        Ok(())
    }
}

/// A megamodel with `gl` and `cl` registered, `cl → gl` and `cl → cl`
/// declared (optional, multiple), and both languages attached.
pub fn engine() -> Megamodel {
    engine_with_gl_uniqueness(false)
}

/// Same as [`engine`], with the `gl` uniqueness flag chosen by the test.
pub fn engine_with_gl_uniqueness(uniqueness: bool) -> Megamodel {
    let mut megamodel = Megamodel::new();
    megamodel
        .register_metamodel(
            Metamodel::new("gl", "glossary", "gls").with_uniqueness(uniqueness),
        )
        .unwrap();
    megamodel
        .register_metamodel(
            Metamodel::new("cl", "class model", "cls").with_kinds(["system", "design"]),
        )
        .unwrap();
    megamodel
        .declare_dependency(MetamodelDependency::new("cl", "gl"))
        .unwrap();
    megamodel
        .declare_dependency(MetamodelDependency::new("cl", "cl"))
        .unwrap();
    megamodel.set_language("gl", Box::new(Glossary)).unwrap();
    megamodel.set_language("cl", Box::new(ClassModel)).unwrap();
    megamodel
}

/// Write one fixture file and return its path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
