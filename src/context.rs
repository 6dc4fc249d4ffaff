//! Parse-time state: the scope stack, pending-key stack, and the handles
//! of the containers currently being filled.

use crate::error::{render_location, Error, Location, Result};
use crate::node::{Node, NodeType};
use crate::scan::Accumulator;

/// What the parser is inside of at a given character. Scopes stack: an
/// object scope may carry a key scope, which becomes an equal-sign scope,
/// which becomes a value scope, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Filling an object's entries (the root starts here).
    Object,
    /// Filling an array's elements.
    Array,
    /// Scanning a key.
    Key,
    /// A key has been scanned and `=` consumed; a value must follow.
    EqualSign,
    /// Scanning a scalar value.
    Value,
    /// `{` after a key; not yet fed any character.
    OpeningBracket,
    /// `{` whose object-or-array nature is still ambiguous. Resolved by
    /// the first `=`, `{`, or content-carrying newline that follows.
    TransientBracket,
    /// Inside a `#` line comment.
    Comment,
    /// Inside a `#{ ... }` block comment.
    NestedComment,
    /// A bare array element is pending and must be flushed before the
    /// next character is interpreted.
    FlushValue,
}

/// A scope tagged with the 1-based position where it was opened and the
/// text of that line, so end-of-input errors can render the unclosed
/// construct.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) scope: Scope,
    pub(crate) at: Location,
    pub(crate) line: String,
}

/// All mutable state threaded through the recognizers.
pub(crate) struct ParseData {
    /// The current physical line, always newline-terminated.
    pub(crate) line: Vec<char>,
    /// Cursor into `line`.
    pub(crate) index: usize,
    /// 1-based number of the current line.
    pub(crate) line_number: usize,
    /// Re-dispatch the current character instead of advancing. Set when a
    /// recognizer ends on a character that still belongs to its enclosing
    /// construct, such as the newline that both ends a comment and ends
    /// the value before it.
    pub(crate) replay: bool,
    pub(crate) scopes: Vec<Frame>,
    /// Pending keys, innermost last. Entry zero is a sentinel so the
    /// stack is never empty.
    pub(crate) keys: Vec<Accumulator>,
    /// Handles of the open containers, root first.
    pub(crate) nodes: Vec<Node>,
    /// The scalar currently being scanned (value or ambiguous-block
    /// content).
    pub(crate) raw: Accumulator,
}

impl ParseData {
    pub(crate) fn new(root: &Node) -> Self {
        Self {
            line: Vec::new(),
            index: 0,
            line_number: 0,
            replay: false,
            scopes: vec![Frame {
                scope: Scope::Object,
                at: Location::new(1, 1),
                line: String::new(),
            }],
            keys: vec![Accumulator::new()],
            nodes: vec![root.clone()],
            raw: Accumulator::new(),
        }
    }

    /// Load the next physical line, appending the newline the last line
    /// of an unterminated file is missing.
    pub(crate) fn begin_line(&mut self, text: &str) {
        self.line = text.chars().collect();
        if self.line.last() != Some(&'\n') {
            self.line.push('\n');
        }
        self.index = 0;
        self.line_number += 1;
    }

    pub(crate) fn ch(&self) -> char {
        self.line.get(self.index).copied().unwrap_or('\n')
    }

    /// One character of same-line lookahead.
    pub(crate) fn peek(&self) -> Option<char> {
        self.line.get(self.index + 1).copied()
    }

    pub(crate) fn top(&self) -> Option<Scope> {
        self.scopes.last().map(|f| f.scope)
    }

    pub(crate) fn push_scope(&mut self, scope: Scope) {
        let at = self.location();
        let line = self.line_text();
        self.scopes.push(Frame { scope, at, line });
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn location(&self) -> Location {
        Location::new(self.line_number.max(1), self.index + 1)
    }

    fn line_text(&self) -> String {
        self.line.iter().collect()
    }

    /// A `Parsing` error pointing at the current character.
    pub(crate) fn parse_error(&self, msg: impl AsRef<str>) -> Error {
        Error::Parsing(format!(
            "{}{}",
            render_location(self.location(), &self.line_text()),
            msg.as_ref()
        ))
    }

    /// A `Parsing` error pointing at a previously recorded position, with
    /// the line captured when the scope opened. Used for constructs left
    /// unfinished at end of input.
    pub(crate) fn parse_error_at(&self, at: Location, line: &str, msg: &str) -> Error {
        Error::Parsing(format!("{}{}", render_location(at, line), msg))
    }

    /// Attach the current location to a literal-classification error.
    fn locate(&self, err: Error) -> Error {
        match err {
            Error::ParsingWrongType(msg) => Error::ParsingWrongType(format!(
                "{}{}",
                render_location(self.location(), &self.line_text()),
                msg
            )),
            other => other,
        }
    }

    /// The scanner the current character belongs to: the key being
    /// scanned, or otherwise the raw value accumulator.
    pub(crate) fn active_in_open_quote(&self) -> bool {
        match self.top() {
            Some(Scope::Key) => self
                .keys
                .last()
                .map(Accumulator::in_open_quote)
                .unwrap_or(false),
            _ => self.raw.in_open_quote(),
        }
    }

    /// A backslash continuation left hanging (checked at end of input).
    pub(crate) fn pending_continuation(&self) -> bool {
        self.raw.in_continuation()
            || self
                .keys
                .last()
                .map(Accumulator::in_continuation)
                .unwrap_or(false)
    }

    /// Finish the raw accumulator into a typed scalar and store it in the
    /// innermost open container: under the pending key for objects,
    /// appended for arrays.
    pub(crate) fn insert_scalar(&mut self) -> Result<()> {
        let acc = self.raw.take();
        let value = acc.to_value().map_err(|e| self.locate(e))?;
        let target = match self.nodes.last() {
            Some(node) => node.clone(),
            None => return Err(self.parse_error("no open container to insert into")),
        };
        if target.is_object() {
            let key = self.keys.last().map(Accumulator::finish).unwrap_or_default();
            target.insert(key, Node::from(value))?;
            self.keys.pop();
        } else {
            target.push_back(Node::from(value))?;
        }
        Ok(())
    }

    /// Open a nested container inside the innermost one and make it the
    /// new insertion target. The pending key stays on the stack until the
    /// container closes.
    pub(crate) fn open_container(&mut self, kind: NodeType) -> Result<()> {
        let child = Node::with_kind(kind);
        let target = match self.nodes.last() {
            Some(node) => node.clone(),
            None => return Err(self.parse_error("no open container to insert into")),
        };
        let stored = if target.is_object() {
            let key = self.keys.last().map(Accumulator::finish).unwrap_or_default();
            target.insert(key, child)?
        } else {
            target.push_back(child)?
        };
        self.nodes.push(stored);
        Ok(())
    }

    /// Store an empty object without opening it, consuming the pending
    /// key. Used for the `key { }` form, and for `{ }` as a bare array
    /// element.
    pub(crate) fn insert_empty_object(&mut self) -> Result<()> {
        let target = match self.nodes.last() {
            Some(node) => node.clone(),
            None => return Err(self.parse_error("no open container to insert into")),
        };
        if target.is_object() {
            let key = self.keys.last().map(Accumulator::finish).unwrap_or_default();
            target.insert(key, Node::with_kind(NodeType::Object))?;
            self.keys.pop();
        } else {
            target.push_back(Node::with_kind(NodeType::Object))?;
        }
        Ok(())
    }
}
