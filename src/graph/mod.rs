//! Generic graph traversal over an arbitrary successor function.
//!
//! Nothing here knows about source files or models; the megamodel uses these
//! helpers for import ordering and import-cycle reporting, and per-language
//! collaborators reuse them for inheritance-cycle detection.

mod traversal;

pub use traversal::{all_paths, find_cycles, post_order};
