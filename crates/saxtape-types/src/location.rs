use std::fmt;
use std::sync::Arc;

/// Position of an event in its source document.
///
/// Line and column are 1-based; `-1` means unknown, matching the convention
/// of document parsers. The system identifier is shared (`Arc<str>`) because
/// long runs of events typically come from the same source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: i32,
    pub column: i32,
    pub system_id: Option<Arc<str>>,
}

impl SourceLocation {
    pub fn new(line: i32, column: i32, system_id: Option<Arc<str>>) -> Self {
        Self {
            line,
            column,
            system_id,
        }
    }

    /// The unknown sentinel: line and column `-1`, no system identifier.
    pub const fn unknown() -> Self {
        Self {
            line: -1,
            column: -1,
            system_id: None,
        }
    }

    /// Whether any component of the position is known.
    pub fn is_known(&self) -> bool {
        self.line >= 0 || self.column >= 0 || self.system_id.is_some()
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.system_id {
            Some(id) => write!(f, "{}:{}:{}", id, self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}
