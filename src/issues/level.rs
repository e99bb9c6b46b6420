//! Severity levels, totally ordered.

/// Severity level of an issue.
///
/// The ordering is total: `OK < Hint < Info < Warning < Error < Fatal <
/// SystemError`. Only `Fatal` aborts the current file's pipeline.
/// `SystemError` is reserved for engine defects surfaced at the outermost
/// boundary; the engine core never raises it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueLevel {
    Ok,
    Hint,
    Info,
    Warning,
    Error,
    Fatal,
    SystemError,
}

impl IssueLevel {
    /// All levels in ascending severity.
    pub const ALL: [IssueLevel; 7] = [
        IssueLevel::Ok,
        IssueLevel::Hint,
        IssueLevel::Info,
        IssueLevel::Warning,
        IssueLevel::Error,
        IssueLevel::Fatal,
        IssueLevel::SystemError,
    ];

    /// Short label used in rendered diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            IssueLevel::Ok => "ok",
            IssueLevel::Hint => "hint",
            IssueLevel::Info => "info",
            IssueLevel::Warning => "warning",
            IssueLevel::Error => "error",
            IssueLevel::Fatal => "fatal",
            IssueLevel::SystemError => "system error",
        }
    }

    /// Whether a raise at this level must abort the current file's build.
    pub fn is_fatal(self) -> bool {
        self >= IssueLevel::Fatal
    }
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Comparison operator for selecting issues by level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelFilter {
    Below,
    AtMost,
    Exactly,
    AtLeast,
    Above,
}

impl LevelFilter {
    pub fn matches(self, level: IssueLevel, reference: IssueLevel) -> bool {
        match self {
            LevelFilter::Below => level < reference,
            LevelFilter::AtMost => level <= reference,
            LevelFilter::Exactly => level == reference,
            LevelFilter::AtLeast => level >= reference,
            LevelFilter::Above => level > reference,
        }
    }
}
