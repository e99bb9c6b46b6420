/// Position tracking for diagnostics.
///
/// Lines are 1-indexed; line 0 is reserved for unlocalized issues that apply
/// to a whole file or model rather than a particular line. Columns are
/// 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// A span representing a range in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The position used for unlocalized issues.
    pub fn unlocalized() -> Self {
        Self { line: 0, column: 0 }
    }

    pub fn is_localized(&self) -> bool {
        self.line != 0
    }

    /// Clamp this position into the line range `[1, nb_lines]` of a file.
    ///
    /// A position before line 1 becomes line 1 column 0; a position past the
    /// last line becomes the end of the last line. `line_len` gives the
    /// character length of a 1-indexed line.
    pub fn clamped(self, nb_lines: u32, line_len: impl Fn(u32) -> u32) -> Self {
        if nb_lines == 0 {
            return Self::new(1, 0);
        }
        if self.line < 1 {
            Self::new(1, 0)
        } else if self.line > nb_lines {
            Self::new(nb_lines, line_len(nb_lines))
        } else {
            let max_col = line_len(self.line);
            Self::new(self.line, self.column.min(max_col))
        }
    }
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from line/column coordinates
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
