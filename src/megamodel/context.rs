//! The Megamodel context: every registry the engine mutates, in one value.
//!
//! All engine state lives here — metamodel registry, attached languages,
//! dependency graph, source registry, model arena, issue store. The engine
//! is single-threaded and run-to-completion: `load_file` on one path may
//! recursively call `load_file` on another from inside a pipeline phase, and
//! the mid-build placeholder state in the source registry is what keeps that
//! re-entrancy (including cyclic imports) terminating.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::dependencies::DependencyGraph;
use super::metamodel::{Metamodel, MetamodelDependency};
use super::registry::{MetamodelRegistry, RegistryError};
use crate::base::{canonical_path, BoxId, ModelId, Position, SourceId};
use crate::build::{
    AnalysisLevel, Language, ModelData, PhaseProgress, SourceEntry, SourceFile, SourceRegistry,
    SourceState,
};
use crate::issues::{codes, Issue, IssueLevel, IssueStore};

/// The process-wide engine coordinating all metamodels, models, source
/// files, and dependencies. Not a global: create one per batch run (or per
/// test) and pass it by reference.
pub struct Megamodel {
    pub(crate) registry: MetamodelRegistry,
    pub(crate) languages: FxHashMap<SmolStr, Box<dyn Language>>,
    pub(crate) dependencies: DependencyGraph,
    pub(crate) sources: SourceRegistry,
    pub(crate) models: Vec<ModelData>,
    pub(crate) issues: IssueStore,
    pub(crate) analysis_level: AnalysisLevel,
    pub(crate) global_box: BoxId,
    pub(crate) own_model: ModelId,
}

impl Megamodel {
    pub fn new() -> Self {
        let mut issues = IssueStore::new();
        let global_box = issues.new_box("megamodel");
        let own_box = issues.new_box("megamodel (model)");
        // The megamodel's own model: a model with no source file.
        let own_model_data = ModelData::new("megamodel", "megamodel", own_box);
        let own_model = ModelId::new(0);
        let mut megamodel = Self {
            registry: MetamodelRegistry::new(),
            languages: FxHashMap::default(),
            dependencies: DependencyGraph::new(),
            sources: SourceRegistry::new(),
            models: vec![own_model_data],
            issues,
            analysis_level: AnalysisLevel::default(),
            global_box,
            own_model,
        };
        megamodel.issues.add_parent(global_box, own_box);
        megamodel
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    pub fn analysis_level(&self) -> AnalysisLevel {
        self.analysis_level
    }

    /// Set once before a batch run; not intended to change mid-run.
    pub fn set_analysis_level(&mut self, level: AnalysisLevel) {
        self.analysis_level = level;
    }

    pub fn register_metamodel(&mut self, metamodel: Metamodel) -> Result<(), RegistryError> {
        self.registry.register(metamodel)
    }

    pub fn declare_dependency(
        &mut self,
        dependency: MetamodelDependency,
    ) -> Result<(), RegistryError> {
        self.registry.declare_dependency(dependency)
    }

    /// Attach the language behavior for a registered metamodel.
    ///
    /// Attachment is separate from registration so languages can name each
    /// other's metamodels in dependency declarations before any behavior
    /// exists.
    pub fn set_language(
        &mut self,
        metamodel: &str,
        language: Box<dyn Language>,
    ) -> Result<(), RegistryError> {
        let id = self.registry.lookup_id(metamodel)?.id.clone();
        self.languages.insert(id, language);
        Ok(())
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Load (or return the already-loaded) file at `path`.
    ///
    /// Returns `None` only when a Fatal was recorded and no usable source
    /// file exists: the path is unreadable, its extension matches no
    /// registered metamodel, or its metamodel has no language attached. A
    /// Fatal raised later, inside the build pipeline, still returns
    /// `Some(id)` with a partial, invalid file.
    ///
    /// Fatals from failed loads land in `sink` when one is given, otherwise
    /// in the global box. Every loaded file's box is also linked under the
    /// global box, which therefore sees every issue of the run.
    pub fn load_file(&mut self, path: &Path, sink: Option<BoxId>) -> Option<SourceId> {
        let canonical = canonical_path(path);

        if let Some(id) = self.sources.lookup(&canonical) {
            return match self.sources.get(id).state {
                SourceState::Reserved | SourceState::Built => Some(id),
                SourceState::Failed => {
                    // The failure is already recorded on the file's box;
                    // expose it to this caller's sink instead of raising a
                    // duplicate.
                    if let Some(sink) = sink {
                        let failed_box = self.sources.get(id).file.issue_box;
                        self.issues.add_parent(sink, failed_box);
                    }
                    None
                }
            };
        }

        let extension = canonical
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("");
        let metamodel = match self.registry.lookup_extension(extension) {
            Ok(metamodel) => metamodel.clone(),
            Err(error) => {
                self.raise_load_fatal(
                    sink,
                    format!("{error} (file '{}')", canonical.display()),
                    codes::UNKNOWN_EXTENSION,
                );
                return None;
            }
        };
        if !self.languages.contains_key(metamodel.id.as_str()) {
            self.raise_load_fatal(
                sink,
                format!(
                    "no language behavior attached for metamodel '{}'",
                    metamodel.id
                ),
                codes::MISSING_LANGUAGE,
            );
            return None;
        }

        let text = match std::fs::read_to_string(&canonical) {
            Ok(text) => text,
            Err(error) => {
                self.register_failed(&canonical, &metamodel.id, sink, error);
                return None;
            }
        };
        let lines: Vec<String> = text.lines().map(str::to_string).collect();

        let id = self.reserve(&canonical, &metamodel.id, lines, sink);
        tracing::debug!(
            file = %canonical.display(),
            metamodel = %metamodel.id,
            level = ?self.analysis_level,
            "load"
        );
        self.run_pipeline(id);
        self.sources.set_state(id, SourceState::Built);
        Some(id)
    }

    /// Register the placeholder entry and its empty model before any phase
    /// runs, so recursive loads of the same path short-circuit to this
    /// instance.
    fn reserve(
        &mut self,
        canonical: &Path,
        metamodel: &SmolStr,
        lines: Vec<String>,
        sink: Option<BoxId>,
    ) -> SourceId {
        let stem: SmolStr = canonical
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| canonical.display().to_string())
            .into();

        let file_box = self.issues.new_box(
            canonical
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| canonical.display().to_string()),
        );
        let model_box = self.issues.new_box(format!("{stem} (model)"));

        let language = &self.languages[metamodel.as_str()];
        let mut model = language.new_model(stem, model_box);
        model.metamodel = metamodel.clone();
        let model_id = ModelId::new(self.models.len() as u32);
        self.models.push(model);

        let mut file = SourceFile::new(canonical.to_path_buf(), metamodel.clone(), lines, file_box);
        file.model = Some(model_id);
        let id = self.sources.reserve(file);
        self.models[model_id.index()].source = Some(id);

        self.issues.add_parent(file_box, model_box);
        self.issues.add_parent(self.global_box, file_box);
        if let Some(sink) = sink {
            self.issues.add_parent(sink, file_box);
        }
        id
    }

    /// Record an unreadable file as a Failed entry carrying one Fatal.
    fn register_failed(
        &mut self,
        canonical: &Path,
        metamodel: &SmolStr,
        sink: Option<BoxId>,
        error: std::io::Error,
    ) {
        let id = self.reserve(canonical, metamodel, Vec::new(), sink);
        let file_box = self.sources.get(id).file.issue_box;
        self.issues.raise(
            file_box,
            Issue::new(
                IssueLevel::Fatal,
                format!("cannot read '{}': {error}", canonical.display()),
                codes::FILE_NOT_FOUND,
                Position::unlocalized(),
            ),
        );
        self.sources.set_state(id, SourceState::Failed);
    }

    fn raise_load_fatal(&mut self, sink: Option<BoxId>, message: String, code: &'static str) {
        let target = sink.unwrap_or(self.global_box);
        self.issues.raise(
            target,
            Issue::new(IssueLevel::Fatal, message, code, Position::unlocalized()),
        );
    }

    /// Load every file under `dir` (recursively) whose extension belongs to
    /// a registered metamodel, in sorted path order. Returns the ids that
    /// loaded; failures leave Fatals behind as `load_file` does.
    pub fn load_directory(&mut self, dir: &Path, sink: Option<BoxId>) -> Vec<SourceId> {
        let extensions = self.metamodel_extensions();
        let mut paths = Vec::new();
        collect_paths(dir, &extensions, &mut paths);
        paths.sort();
        paths
            .iter()
            .filter_map(|path| self.load_file(path, sink))
            .collect()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Registered file extensions, for directory scanning.
    pub fn metamodel_extensions(&self) -> Vec<SmolStr> {
        self.registry.extensions()
    }

    /// Dependency-first ordering of everything reachable from `roots`.
    pub fn source_file_list(&self, roots: impl IntoIterator<Item = SourceId>) -> Vec<SourceId> {
        self.dependencies.source_file_list(roots)
    }

    pub fn registry(&self) -> &MetamodelRegistry {
        &self.registry
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dependencies
    }

    pub fn issues(&self) -> &IssueStore {
        &self.issues
    }

    /// Allocate an issue box usable as a `load_file` sink.
    pub fn new_issue_box(&mut self, label: impl Into<SmolStr>) -> BoxId {
        self.issues.new_box(label)
    }

    /// The box that sees every issue of the run.
    pub fn global_box(&self) -> BoxId {
        self.global_box
    }

    /// The megamodel's own model (a model with no source).
    pub fn own_model(&self) -> ModelId {
        self.own_model
    }

    pub fn source(&self, id: SourceId) -> &SourceFile {
        &self.sources.get(id).file
    }

    pub fn source_entry(&self, id: SourceId) -> &SourceEntry {
        self.sources.get(id)
    }

    pub fn source_state(&self, id: SourceId) -> SourceState {
        self.sources.get(id).state
    }

    pub fn progress(&self, id: SourceId) -> PhaseProgress {
        self.sources.get(id).progress
    }

    /// The registered id for a path, without loading anything.
    pub fn source_id(&self, path: &Path) -> Option<SourceId> {
        self.sources.lookup(&canonical_path(path))
    }

    pub fn model(&self, id: ModelId) -> &ModelData {
        &self.models[id.index()]
    }

    /// A source file is valid while nothing at Fatal or above is visible
    /// from its box (its own issues, its model's, and its imports').
    pub fn is_source_valid(&self, id: SourceId) -> bool {
        self.issues.is_valid(self.sources.get(id).file.issue_box)
    }
}

impl Default for Megamodel {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_paths(dir: &Path, extensions: &[SmolStr], out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(dir = %dir.display(), %error, "skipping unreadable directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_paths(&path, extensions, out);
        } else if let Some(extension) = path.extension().and_then(|extension| extension.to_str()) {
            if extensions.iter().any(|known| known == extension) {
                out.push(path);
            }
        }
    }
}
