//! The per-file build pipeline.
//!
//! Phases run in a fixed order, gated by the process-wide analysis level:
//! parse → discover dependencies → fill model → resolve → finalize. Each
//! phase returns `Result<(), Fatal>`; the driver matches once per phase and
//! stops the file at the first Fatal, so there is exactly one control-flow
//! signal and it never crosses a file boundary. The file stays registered
//! with whatever phases completed.
//!
//! Dependency discovery re-enters `Megamodel::load_file` for each import
//! target. The importing file was registered (Reserved) before this phase
//! started, so a cyclic import chain resolves to the in-progress entry
//! instead of recursing forever.

use std::path::PathBuf;

use smol_str::SmolStr;

use super::ast::ImportStatement;
use super::language::{Language, ModelContext};
use super::source::{SourceImport, SourceState};
use crate::base::{Position, SourceId};
use crate::issues::{codes, Issue, IssueLevel};
use crate::megamodel::{Megamodel, RegistryError};

/// How far each file's pipeline runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisLevel {
    /// Parse only.
    JustAst,
    /// Parse and discover dependencies (loads imported files).
    JustAstDep,
    /// All phases.
    #[default]
    Full,
}

impl AnalysisLevel {
    pub fn includes_dependencies(self) -> bool {
        self >= AnalysisLevel::JustAstDep
    }

    pub fn includes_semantics(self) -> bool {
        self == AnalysisLevel::Full
    }
}

/// A failure that stops the current file's build.
///
/// Phases return this instead of raising: the driver records it once on the
/// file's issue box (clamped into the file's line range) and runs no
/// further phase for that file.
#[derive(Clone, Debug)]
pub struct Fatal {
    pub message: String,
    pub code: SmolStr,
    pub position: Position,
}

impl Fatal {
    /// An unlocalized fatal (whole-file condition).
    pub fn new(message: impl Into<String>, code: impl Into<SmolStr>) -> Self {
        Self::at(message, code, Position::unlocalized())
    }

    pub fn at(message: impl Into<String>, code: impl Into<SmolStr>, position: Position) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            position,
        }
    }

    pub fn at_line(message: impl Into<String>, code: impl Into<SmolStr>, line: u32) -> Self {
        Self::at(message, code, Position::new(line, 0))
    }
}

/// Which phases have completed for one file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseProgress {
    pub parsed: bool,
    pub dependencies_discovered: bool,
    pub filled: bool,
    pub resolved: bool,
    pub finalized: bool,
}

impl Megamodel {
    /// Drive all phases for a reserved file, up to the analysis level.
    pub(crate) fn run_pipeline(&mut self, id: SourceId) {
        let level = self.analysis_level();
        if let Err(fatal) = self.phase_parse(id) {
            self.record_fatal(id, fatal);
            return;
        }
        if level.includes_dependencies() {
            if let Err(fatal) = self.phase_discover(id) {
                self.record_fatal(id, fatal);
                return;
            }
        }
        if level.includes_semantics() {
            if let Err(fatal) = self.phase_fill(id) {
                self.record_fatal(id, fatal);
                return;
            }
            if let Err(fatal) = self.phase_resolve(id) {
                self.record_fatal(id, fatal);
                return;
            }
            if let Err(fatal) = self.phase_finalize(id) {
                self.record_fatal(id, fatal);
            }
        }
    }

    /// Phase 1: grammar parse, delegated to the file's language.
    fn phase_parse(&mut self, id: SourceId) -> Result<(), Fatal> {
        let Megamodel {
            languages, sources, ..
        } = self;
        let entry = sources.get_mut(id);
        let language = languages
            .get(entry.file.metamodel.as_str())
            .ok_or_else(|| missing_language(&entry.file.metamodel))?;
        let ast = language.parse(&entry.file)?;
        tracing::debug!(
            file = %entry.file.path.display(),
            imports = ast.imports.len(),
            "parsed"
        );
        entry.file.ast = Some(ast);
        entry.progress.parsed = true;
        Ok(())
    }

    /// Phase 2: scan the AST for the declaration and import statements,
    /// loading each import target and recording the dependency edges.
    fn phase_discover(&mut self, id: SourceId) -> Result<(), Fatal> {
        let (declaration, imports) = {
            let entry = self.sources.get(id);
            let Some(ast) = &entry.file.ast else {
                return Ok(());
            };
            (ast.declaration.clone(), ast.imports.clone())
        };

        if let Some(declaration) = declaration {
            let entry = self.sources.get_mut(id);
            entry.file.import_box.name = Some(declaration.name.clone());
            entry.file.import_box.kinds = declaration.kinds.clone();
            entry.file.import_box.description = declaration.description.clone();
            if let Some(model_id) = entry.file.model {
                let model = &mut self.models[model_id.index()];
                model.name = declaration.name;
                model.kinds = declaration.kinds;
                model.description = declaration.description;
            }
        }

        let importer_metamodel = self.sources.get(id).file.metamodel.clone();
        let importer_dir = self
            .sources
            .get(id)
            .file
            .path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();

        for statement in imports {
            let unique = self
                .registry
                .lookup_id(&statement.metamodel)
                .map_err(|_| {
                    Fatal::at(
                        format!("import names unknown metamodel '{}'", statement.metamodel),
                        codes::UNKNOWN_IMPORT_METAMODEL,
                        statement.position,
                    )
                })?
                .uniqueness;

            // The registry must declare this cross-language dependency,
            // unambiguously. A miss here is a configuration defect, not a
            // problem with the user's file.
            self.registry
                .dependency(&importer_metamodel, &statement.metamodel)
                .map_err(|error| {
                    let code = match error {
                        RegistryError::AmbiguousDependency { .. } => codes::AMBIGUOUS_DEPENDENCY,
                        _ => codes::INVALID_DEPENDENCY,
                    };
                    Fatal::at(error.to_string(), code, statement.position)
                })?;

            let target_path = importer_dir.join(&statement.target);
            let Some(imported) = self.load_file(&target_path, None) else {
                return Err(Fatal::at(
                    format!("cannot load imported file '{}'", statement.target),
                    codes::UNRESOLVED_IMPORT,
                    statement.position,
                ));
            };
            self.link_import(id, imported, &statement, unique)?;
        }

        self.sources.get_mut(id).progress.dependencies_discovered = true;
        Ok(())
    }

    /// Record one resolved import: the entry in the importer's import box,
    /// the file-level dependency, the implied model-level dependency
    /// (idempotent under diamond imports), and the diagnostics parent link.
    ///
    /// The import box is filled first: an import rejected by the uniqueness
    /// rule leaves no dependency edge behind, only its Fatal.
    fn link_import(
        &mut self,
        importer: SourceId,
        imported: SourceId,
        statement: &ImportStatement,
        unique: bool,
    ) -> Result<(), Fatal> {
        let import = SourceImport {
            metamodel: statement.metamodel.clone(),
            importing: importer,
            imported,
            target_text: statement.target.clone(),
            position: statement.position,
        };
        self.sources
            .get_mut(importer)
            .file
            .import_box
            .add(import, unique)?;

        self.dependencies
            .add_source_dependency(importer, imported, &statement.metamodel, statement.position);

        let (importer_model, imported_model, importer_box, imported_box) = {
            let source = &self.sources.get(importer).file;
            let target = &self.sources.get(imported).file;
            (
                source.model,
                target.model,
                source.issue_box,
                target.issue_box,
            )
        };
        if let (Some(source_model), Some(target_model)) = (importer_model, imported_model) {
            self.dependencies
                .register_model_dependency(source_model, target_model, &statement.metamodel);
        }
        self.issues.add_parent(importer_box, imported_box);
        Ok(())
    }

    /// Phase 3: AST → model elements, delegated.
    fn phase_fill(&mut self, id: SourceId) -> Result<(), Fatal> {
        self.with_context(id, |language, context| language.fill_model(context))?;
        self.sources.get_mut(id).progress.filled = true;
        Ok(())
    }

    /// Phase 4: forward references → real targets, delegated.
    fn phase_resolve(&mut self, id: SourceId) -> Result<(), Fatal> {
        self.with_context(id, |language, context| language.resolve(context))?;
        self.sources.get_mut(id).progress.resolved = true;
        Ok(())
    }

    /// Phase 5: whole-graph closure, delegated. Reaching this phase means
    /// no earlier phase of this file raised a Fatal.
    fn phase_finalize(&mut self, id: SourceId) -> Result<(), Fatal> {
        self.with_context(id, |language, context| language.finalize(context))?;
        self.sources.get_mut(id).progress.finalized = true;
        Ok(())
    }

    fn with_context<F>(&mut self, id: SourceId, run: F) -> Result<(), Fatal>
    where
        F: FnOnce(&dyn Language, &mut ModelContext<'_>) -> Result<(), Fatal>,
    {
        let Megamodel {
            languages,
            sources,
            models,
            issues,
            dependencies,
            ..
        } = self;
        let entry = sources.get(id);
        let file = &entry.file;
        let Some(ast) = &file.ast else {
            return Ok(());
        };
        let Some(model_id) = file.model else {
            return Ok(());
        };
        let language = languages
            .get(file.metamodel.as_str())
            .ok_or_else(|| missing_language(&file.metamodel))?;
        let mut context = ModelContext {
            file,
            ast,
            model_id,
            models: models.as_mut_slice(),
            issues,
            dependencies: &*dependencies,
        };
        run(language.as_ref(), &mut context)
    }

    /// Record a phase's Fatal on the file's box and mark the entry built
    /// with whatever completed.
    fn record_fatal(&mut self, id: SourceId, fatal: Fatal) {
        let (target, position) = {
            let file = &self.sources.get(id).file;
            let position = if fatal.position.is_localized() {
                file.clamp(fatal.position)
            } else {
                Position::unlocalized()
            };
            (file.issue_box, position)
        };
        tracing::debug!(
            file = %self.sources.get(id).file.path.display(),
            code = %fatal.code,
            "build stopped"
        );
        self.issues.raise(
            target,
            Issue::new(IssueLevel::Fatal, fatal.message, fatal.code, position),
        );
        self.sources.set_state(id, SourceState::Built);
    }
}

fn missing_language(metamodel: &str) -> Fatal {
    Fatal::new(
        format!("no language behavior attached for metamodel '{metamodel}'"),
        codes::MISSING_LANGUAGE,
    )
}
