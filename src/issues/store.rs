//! Issue boxes and the process-wide issue store.
//!
//! Boxes are arena-allocated; parent links form a DAG (diamond-shaped import
//! graphs give two children one shared parent). Transitive views walk the
//! DAG with a visited set so a shared ancestor contributes its issues once.
//! Views are computed on each access, not cached; callers with deep chains
//! that query repeatedly should memoize on their side.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::issue::Issue;
use super::level::{IssueLevel, LevelFilter};
use crate::base::BoxId;

/// One diagnostics container, owned by a diagnosable entity.
#[derive(Debug, Default)]
pub struct IssueBox {
    label: SmolStr,
    /// Issues indexed by line; line 0 holds unlocalized issues.
    by_line: BTreeMap<u32, Vec<Issue>>,
    parents: Vec<BoxId>,
}

impl IssueBox {
    /// Human-readable owner label, used when rendering summaries.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parents(&self) -> &[BoxId] {
        &self.parents
    }

    /// Issues raised directly on this box, in line order.
    pub fn local(&self) -> impl Iterator<Item = &Issue> {
        self.by_line.values().flatten()
    }

    /// Issues raised directly on this box at one line.
    pub fn local_at(&self, line: u32) -> &[Issue] {
        self.by_line.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.values().all(Vec::is_empty)
    }
}

/// Arena of every issue box in one megamodel.
#[derive(Debug, Default)]
pub struct IssueStore {
    boxes: Vec<IssueBox>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty box for a new diagnosable entity.
    pub fn new_box(&mut self, label: impl Into<SmolStr>) -> BoxId {
        let id = BoxId::new(self.boxes.len() as u32);
        self.boxes.push(IssueBox {
            label: label.into(),
            by_line: BTreeMap::new(),
            parents: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: BoxId) -> &IssueBox {
        &self.boxes[id.index()]
    }

    /// Link `parent` into `child`'s transitive view.
    ///
    /// When file A imports file B, B's box is added as a parent of A's box so
    /// that A sees B's issues. Duplicate and self links are ignored.
    pub fn add_parent(&mut self, child: BoxId, parent: BoxId) {
        if child == parent {
            return;
        }
        let entry = &mut self.boxes[child.index()];
        if !entry.parents.contains(&parent) {
            entry.parents.push(parent);
        }
    }

    /// Append an issue to a box.
    ///
    /// The caller is responsible for clamping localized positions into the
    /// owning file's line range before raising.
    pub fn raise(&mut self, target: BoxId, issue: Issue) {
        tracing::trace!(target_box = %target, level = %issue.level, code = %issue.code, "raise");
        self.boxes[target.index()]
            .by_line
            .entry(issue.line())
            .or_default()
            .push(issue);
    }

    /// Boxes visible from `root`: ancestors first, each box once.
    fn visible_boxes(&self, root: BoxId) -> Vec<BoxId> {
        let mut order = Vec::new();
        let mut visited = FxHashSet::default();
        self.visit_ancestors_first(root, &mut visited, &mut order);
        order
    }

    fn visit_ancestors_first(
        &self,
        current: BoxId,
        visited: &mut FxHashSet<BoxId>,
        order: &mut Vec<BoxId>,
    ) {
        if !visited.insert(current) {
            return;
        }
        for &parent in &self.boxes[current.index()].parents {
            self.visit_ancestors_first(parent, visited, order);
        }
        order.push(current);
    }

    /// The transitive union of this box's issues and all its ancestors'.
    pub fn all(&self, root: BoxId) -> Vec<&Issue> {
        self.visible_boxes(root)
            .into_iter()
            .flat_map(|id| self.get(id).local())
            .collect()
    }

    /// Issues at one line, ancestors' issues before or after local ones.
    pub fn at(&self, root: BoxId, line: u32, parents_first: bool) -> Vec<&Issue> {
        let mut boxes = self.visible_boxes(root);
        if !parents_first {
            // visible_boxes is ancestors-first with `root` last
            boxes.reverse();
        }
        boxes
            .into_iter()
            .flat_map(|id| self.get(id).local_at(line))
            .collect()
    }

    /// Transitive issues whose level matches `filter` against `reference`.
    pub fn select(&self, root: BoxId, reference: IssueLevel, filter: LevelFilter) -> Vec<&Issue> {
        self.all(root)
            .into_iter()
            .filter(|issue| filter.matches(issue.level, reference))
            .collect()
    }

    /// Transitive issues at Error or above.
    pub fn big_issues(&self, root: BoxId) -> Vec<&Issue> {
        self.select(root, IssueLevel::Error, LevelFilter::AtLeast)
    }

    /// Transitive issues at Warning or below.
    pub fn small_issues(&self, root: BoxId) -> Vec<&Issue> {
        self.select(root, IssueLevel::Warning, LevelFilter::AtMost)
    }

    /// Transitive issue counts per level, ascending severity, zero counts
    /// omitted.
    pub fn summary_level_map(&self, root: BoxId) -> IndexMap<IssueLevel, usize> {
        let all = self.all(root);
        let mut map = IndexMap::new();
        for level in IssueLevel::ALL {
            let count = all.iter().filter(|issue| issue.level == level).count();
            if count > 0 {
                map.insert(level, count);
            }
        }
        map
    }

    /// Transitive issue counts per code, in first-seen order.
    pub fn summary_code_map(&self, root: BoxId) -> IndexMap<SmolStr, usize> {
        let mut map = IndexMap::new();
        for issue in self.all(root) {
            *map.entry(issue.code.clone()).or_insert(0) += 1;
        }
        map
    }

    /// Highest level among transitive issues; `Ok` when there are none.
    pub fn max_level(&self, root: BoxId) -> IssueLevel {
        self.all(root)
            .into_iter()
            .map(|issue| issue.level)
            .max()
            .unwrap_or(IssueLevel::Ok)
    }

    /// A box is valid while nothing at Fatal or above is visible from it.
    pub fn is_valid(&self, root: BoxId) -> bool {
        self.max_level(root) < IssueLevel::Fatal
    }
}
