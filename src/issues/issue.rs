//! Issue type and standard issue codes.

use smol_str::SmolStr;

use super::level::IssueLevel;
use crate::base::Position;

/// A single diagnostic message.
///
/// `position.line` is 0 for unlocalized issues; localized issues carry a line
/// already clamped into the owning file's `[1, nb_lines]` range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub level: IssueLevel,
    pub message: SmolStr,
    /// Stable code (e.g. "E0102"), used for grouping and machine checks.
    pub code: SmolStr,
    pub position: Position,
}

impl Issue {
    pub fn new(
        level: IssueLevel,
        message: impl Into<SmolStr>,
        code: impl Into<SmolStr>,
        position: Position,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            code: code.into(),
            position,
        }
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.position.is_localized() {
            write!(
                f,
                "{} [{}] at {}: {}",
                self.level, self.code, self.position, self.message
            )
        } else {
            write!(f, "{} [{}]: {}", self.level, self.code, self.message)
        }
    }
}

/// Standard issue codes raised by the engine.
///
/// ## Code Ranges
///
/// - **E0001-E0099**: engine configuration defects (non-recoverable; a Fatal
///   carrying one of these signals broken language declarations, not a bad
///   user file)
/// - **E0100-E0199**: per-file build errors
pub mod codes {
    // ========================================================================
    // CONFIGURATION DEFECTS (E0001-E0099)
    // ========================================================================

    /// No metamodel registered under the requested id/label/extension.
    pub const UNKNOWN_METAMODEL: &str = "E0001";
    /// No metamodel dependency declared for an (importer, imported) pair.
    pub const INVALID_DEPENDENCY: &str = "E0002";
    /// More than one metamodel dependency declared for one ordered pair.
    pub const AMBIGUOUS_DEPENDENCY: &str = "E0003";
    /// A metamodel was registered twice, or two metamodels share a key.
    pub const DUPLICATE_METAMODEL: &str = "E0004";
    /// No language behavior attached for a registered metamodel.
    pub const MISSING_LANGUAGE: &str = "E0005";

    // ========================================================================
    // BUILD ERRORS (E0100-E0199)
    // ========================================================================

    /// The file could not be read.
    pub const FILE_NOT_FOUND: &str = "E0100";
    /// The file extension matches no registered metamodel.
    pub const UNKNOWN_EXTENSION: &str = "E0101";
    /// The language parser rejected the text.
    pub const SYNTAX_ERROR: &str = "E0102";
    /// An import target could not be loaded.
    pub const UNRESOLVED_IMPORT: &str = "E0103";
    /// An import names a metamodel id that is not registered.
    pub const UNKNOWN_IMPORT_METAMODEL: &str = "E0104";
    /// A second import under a uniqueness=true metamodel id.
    pub const DUPLICATE_UNIQUE_IMPORT: &str = "E0105";
    /// A forward reference never resolved to a declared symbol.
    pub const UNRESOLVED_SYMBOL: &str = "E0106";

    /// Whether a code signals a configuration defect callers must treat as
    /// non-recoverable.
    pub fn is_configuration_defect(code: &str) -> bool {
        matches!(
            code,
            UNKNOWN_METAMODEL
                | INVALID_DEPENDENCY
                | AMBIGUOUS_DEPENDENCY
                | DUPLICATE_METAMODEL
                | MISSING_LANGUAGE
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_localized() {
        let issue = Issue::new(
            IssueLevel::Fatal,
            "unexpected token",
            codes::SYNTAX_ERROR,
            Position::new(3, 4),
        );
        assert_eq!(issue.to_string(), "fatal [E0102] at 3:4: unexpected token");
    }

    #[test]
    fn test_display_unlocalized() {
        let issue = Issue::new(
            IssueLevel::Warning,
            "model has no description",
            "W0001",
            Position::unlocalized(),
        );
        assert_eq!(
            issue.to_string(),
            "warning [W0001]: model has no description"
        );
    }

    #[test]
    fn test_configuration_codes() {
        assert!(codes::is_configuration_defect(codes::INVALID_DEPENDENCY));
        assert!(!codes::is_configuration_defect(codes::SYNTAX_ERROR));
    }
}
