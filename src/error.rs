//! Error types for luco parsing and tree access.

use thiserror::Error;

/// Result type for luco operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A 1-based source position used in parse diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Create a new location from 1-based line and column numbers.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Render a source snippet pointing at the offending column:
///
/// ```text
/// 3:8
///   3 | port = }
///     |        ^
/// ```
///
/// Every parsing error carries one of these so the caller can see exactly
/// where the input went wrong. Tabs in the echoed line are flattened to
/// spaces so the caret column stays aligned.
pub(crate) fn render_location(loc: Location, line: &str) -> String {
    let text: String = line
        .trim_end_matches('\n')
        .chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect();
    let gutter = loc.line.to_string();
    let caret_pad = loc.column.saturating_sub(1);
    format!(
        "{}\n  {} | {}\n  {} | {}^\n",
        loc,
        gutter,
        text,
        " ".repeat(gutter.len()),
        " ".repeat(caret_pad),
    )
}

/// Error type for luco parsing and document access.
///
/// Every fallible operation in the crate returns one of these; nothing in
/// the parsing engine panics. The panicking accessors (`Node::at`,
/// `Value::as_integer`, `parse`, ...) are thin wrappers that surface the
/// same errors via `panic!` for call sites that prefer it.
#[derive(Error, Debug)]
pub enum Error {
    /// Object lookup for a key that does not exist.
    #[error("key '{0}' not found")]
    KeyNotFound(String),

    /// Array access outside the valid index range.
    #[error("index '{0}' out of range")]
    WrongIndex(usize),

    /// File open/read/write failure; carries the OS error text verbatim.
    #[error("{0}")]
    Filesystem(String),

    /// Malformed input. The message carries a rendered source-location
    /// snippet followed by a description of what was expected.
    #[error("{0}")]
    Parsing(String),

    /// A scalar literal that matched a type's shape but could not be
    /// converted to it, such as an all-digit token that overflows a
    /// 64-bit integer.
    #[error("{0}")]
    ParsingWrongType(String),

    /// API misuse: casting a node or value to the wrong kind, combining
    /// incompatible nodes, or mutating the wrong container kind.
    #[error("{0}")]
    WrongType(String),
}

impl Error {
    /// Returns `true` for syntax errors produced by the parser.
    pub fn is_parsing(&self) -> bool {
        matches!(self, Error::Parsing(_) | Error::ParsingWrongType(_))
    }

    /// Returns `true` for type-misuse errors.
    pub fn is_wrong_type(&self) -> bool {
        matches!(self, Error::WrongType(_))
    }

    /// Returns `true` for missing-key lookups.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_location_caret_column() {
        let rendered = render_location(Location::new(3, 8), "port = }\n");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "3:8");
        assert_eq!(lines[1], "  3 | port = }");
        assert_eq!(lines[2], "    |        ^");
    }

    #[test]
    fn test_render_location_first_column() {
        let rendered = render_location(Location::new(1, 1), "}\n");
        assert!(rendered.starts_with("1:1\n"));
        assert!(rendered.ends_with("| ^\n"));
    }

    #[test]
    fn test_error_kind_predicates() {
        assert!(Error::Parsing(String::new()).is_parsing());
        assert!(Error::ParsingWrongType(String::new()).is_parsing());
        assert!(Error::WrongType(String::new()).is_wrong_type());
        assert!(Error::KeyNotFound("k".into()).is_key_not_found());
        assert!(!Error::KeyNotFound("k".into()).is_parsing());
    }
}
