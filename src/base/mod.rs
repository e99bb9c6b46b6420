//! Foundation types for the megamodel engine.
//!
//! This module provides fundamental types used throughout the engine:
//! - [`SourceId`], [`ModelId`], [`BoxId`] - Arena identifiers
//! - [`Position`], [`Span`] - Line/column positions for diagnostics
//! - Canonical path normalization
//!
//! This module has NO dependencies on other megamodel modules.

mod ids;
mod paths;
mod position;

pub use ids::{BoxId, ModelId, SourceId};
pub use paths::canonical_path;
pub use position::{Position, Span};
