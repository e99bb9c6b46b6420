//! Diagnostics — severity-leveled issues grouped into parent-chained boxes.
//!
//! Every diagnosable entity (source file, model, the megamodel itself) owns
//! an [`IssueBox`] in the process-wide [`IssueStore`]. Boxes form a DAG via
//! parent links: when file A imports file B, B's box becomes a parent of A's
//! box, so A's transitive view (`all`) includes B's issues. Only a
//! [`IssueLevel::Fatal`] aborts the current file's build; everything below it
//! merely accumulates.

mod issue;
mod level;
mod store;

pub use issue::{Issue, codes};
pub use level::{IssueLevel, LevelFilter};
pub use store::{IssueBox, IssueStore};
