//! Source files, import boxes, and the path-keyed source registry.
//!
//! The registry guarantees exactly one [`SourceFile`] per canonical path.
//! An entry is reserved (placeholder state) before its build pipeline runs,
//! so a cyclic import chain resolves to the in-progress instance instead of
//! recursing forever.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::ast::Ast;
use super::pipeline::{Fatal, PhaseProgress};
use crate::base::{BoxId, ModelId, Position, SourceId};
use crate::issues::codes;

/// Registry state of one source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceState {
    /// Registered by path; the build pipeline has not finished. Recursive
    /// lookups during a cyclic import resolve to this placeholder.
    Reserved,
    /// The pipeline ran to its gated end (possibly stopped early by a Fatal).
    Built,
    /// The file could never be registered usefully (unreadable).
    Failed,
}

/// One resolved import statement.
#[derive(Clone, Debug)]
pub struct SourceImport {
    /// Metamodel id of the imported language.
    pub metamodel: SmolStr,
    pub importing: SourceId,
    pub imported: SourceId,
    /// Target path as written in the import statement.
    pub target_text: String,
    pub position: Position,
}

/// The resolved imports and declared identity of one source file.
#[derive(Debug, Default)]
pub struct ImportBox {
    /// Declared model name, from the file's declaration statement.
    pub name: Option<SmolStr>,
    pub kinds: Vec<SmolStr>,
    pub description: Option<String>,
    /// Imports grouped by imported metamodel id, in first-seen order.
    imports: IndexMap<SmolStr, Vec<SourceImport>>,
}

impl ImportBox {
    /// Add a resolved import under its metamodel id.
    ///
    /// `unique` carries the imported metamodel's uniqueness flag: a second
    /// import under a uniqueness=true id is a Fatal.
    pub fn add(&mut self, import: SourceImport, unique: bool) -> Result<(), Fatal> {
        let group = self.imports.entry(import.metamodel.clone()).or_default();
        if unique && !group.is_empty() {
            return Err(Fatal::at(
                format!(
                    "metamodel '{}' admits a single import, but '{}' is a second one",
                    import.metamodel, import.target_text
                ),
                codes::DUPLICATE_UNIQUE_IMPORT,
                import.position,
            ));
        }
        group.push(import);
        Ok(())
    }

    /// Imports under one metamodel id.
    pub fn imports_for(&self, metamodel: &str) -> &[SourceImport] {
        self.imports.get(metamodel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All imports, grouped by metamodel id in first-seen order.
    pub fn groups(&self) -> impl Iterator<Item = (&SmolStr, &[SourceImport])> {
        self.imports.iter().map(|(id, group)| (id, group.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceImport> {
        self.imports.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.imports.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One physical file: raw lines, diagnostics box, model link, import box.
#[derive(Debug)]
pub struct SourceFile {
    /// Canonical path, the registry key.
    pub path: PathBuf,
    /// Metamodel id selected from the file extension.
    pub metamodel: SmolStr,
    lines: Vec<String>,
    pub model: Option<ModelId>,
    pub import_box: ImportBox,
    pub issue_box: BoxId,
    /// Set by the parse phase; `None` while parsing has not succeeded.
    pub ast: Option<Ast>,
}

impl SourceFile {
    pub fn new(
        path: PathBuf,
        metamodel: SmolStr,
        lines: Vec<String>,
        issue_box: BoxId,
    ) -> Self {
        Self {
            path,
            metamodel,
            lines,
            model: None,
            import_box: ImportBox::default(),
            issue_box,
            ast: None,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn nb_lines(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Character length of a 1-indexed line; 0 for lines out of range.
    pub fn line_len(&self, line: u32) -> u32 {
        self.lines
            .get((line as usize).wrapping_sub(1))
            .map(|text| text.chars().count() as u32)
            .unwrap_or(0)
    }

    /// Clamp a position into this file's `[1, nb_lines]` range.
    pub fn clamp(&self, position: Position) -> Position {
        position.clamped(self.nb_lines(), |line| self.line_len(line))
    }

    /// File name used to label the diagnostics box.
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug)]
pub struct SourceEntry {
    pub file: SourceFile,
    pub state: SourceState,
    pub progress: PhaseProgress,
}

/// Path-keyed, de-duplicated store of every file seen.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    by_path: FxHashMap<PathBuf, SourceId>,
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, canonical: &Path) -> Option<SourceId> {
        self.by_path.get(canonical).copied()
    }

    /// Register a placeholder entry for `file` before its pipeline runs.
    pub fn reserve(&mut self, file: SourceFile) -> SourceId {
        let id = SourceId::new(self.entries.len() as u32);
        self.by_path.insert(file.path.clone(), id);
        self.entries.push(SourceEntry {
            file,
            state: SourceState::Reserved,
            progress: PhaseProgress::default(),
        });
        id
    }

    pub fn get(&self, id: SourceId) -> &SourceEntry {
        &self.entries[id.index()]
    }

    pub fn get_mut(&mut self, id: SourceId) -> &mut SourceEntry {
        &mut self.entries[id.index()]
    }

    pub fn set_state(&mut self, id: SourceId, state: SourceState) {
        self.entries[id.index()].state = state;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &SourceEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (SourceId::new(index as u32), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
