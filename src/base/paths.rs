//! Canonical path normalization.
//!
//! Every source file is keyed by a canonical path so that `./a/../a/x.cls`
//! and `a/x.cls` resolve to the same registry entry. Normalization is lexical
//! (no filesystem access): a path is first made absolute against the current
//! directory, then `.` components are dropped and `..` components pop their
//! parent. This works whether or not the file exists yet, which matters
//! because a file is reserved in the registry before it is read.

use std::path::{Component, Path, PathBuf};

/// Normalize `path` into the canonical registry key.
pub fn canonical_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    normalize_lexically(&absolute)
}

/// Drop `.` components and pop parents for `..` components.
///
/// A leading `..` with nothing to pop is kept as-is rather than silently
/// discarded, so malformed relative paths stay distinguishable.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_in_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if ends_in_normal {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
