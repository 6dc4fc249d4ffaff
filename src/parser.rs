//! The parsing engine: per-character dispatch over the token recognizers,
//! the stray-character classifier, and the line-buffered input drivers.
//!
//! Every character of every line is offered to the recognizers in a fixed
//! order: comment, key, value, opening bracket, closing bracket. The first
//! one to claim it wins. Unclaimed characters fall to [`classify_stray`],
//! which skips whitespace and turns anything else into a located
//! `Parsing` error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::context::{ParseData, Scope};
use crate::error::{Error, Result};
use crate::node::{Node, NodeType};
use crate::scan::Accumulator;
use crate::token::{Outcome, Syntax};

fn dispatch(syntax: &mut Syntax, data: &mut ParseData) -> Result<()> {
    if syntax.comment.handle(data)? == Outcome::Handled {
        return Ok(());
    }
    if syntax.key.handle(data)? == Outcome::Handled {
        return Ok(());
    }
    if syntax.value.handle(data)? == Outcome::Handled {
        return Ok(());
    }
    if syntax.opening.handle(data)? == Outcome::Handled {
        return Ok(());
    }
    if syntax.closing.handle(data)? == Outcome::Handled {
        return Ok(());
    }
    classify_stray(data)
}

/// Characters no recognizer wanted. Whitespace and newlines advance
/// silently; structural characters in the wrong position are reported
/// with what was expected instead.
fn classify_stray(data: &mut ParseData) -> Result<()> {
    let ch = data.ch();
    if matches!(ch, ' ' | '\t' | '\n') {
        return Ok(());
    }

    let cont_quote = match data.top() {
        Some(Scope::Key) => data.keys.last().and_then(Accumulator::continuation_quote),
        _ => data.raw.continuation_quote(),
    };
    if let Some(quote) = cont_quote {
        return Err(data.parse_error(format!(
            "expected '{}' to re-open the string on the new line but found '{}'",
            quote.as_char(),
            ch
        )));
    }

    if data.raw.ended_quoted() {
        return Err(data.parse_error(format!(
            "expected a newline after the value but found '{ch}'"
        )));
    }

    if data.top() == Some(Scope::Key)
        && data
            .keys
            .last()
            .map(Accumulator::ended)
            .unwrap_or(false)
    {
        return Err(data.parse_error(format!(
            "expected '=' or '{{' after the key but found '{ch}'"
        )));
    }

    if ch == '=' && matches!(data.top(), Some(Scope::Value) | Some(Scope::EqualSign)) {
        return Err(data.parse_error("expected a newline after the value but found '='"));
    }

    if ch == '{' && data.top() == Some(Scope::Object) {
        return Err(data.parse_error("expected a key in the object but found '{'"));
    }

    if ch == '}' {
        return Err(data.parse_error("found '}' without being in an object or array"));
    }

    // Anything else in a position no recognizer wants is skipped; the
    // construct it belongs to reports the real problem when it ends.
    Ok(())
}

/// One in-progress parse. Lines go in through [`Engine::feed_line`];
/// [`Engine::finish`] runs the end-of-input checks and yields the root.
pub(crate) struct Engine {
    data: ParseData,
    syntax: Syntax,
    root: Node,
}

impl Engine {
    pub(crate) fn new() -> Self {
        let root = Node::with_kind(NodeType::Object);
        Engine {
            data: ParseData::new(&root),
            syntax: Syntax::default(),
            root,
        }
    }

    /// Feed one physical line. A missing trailing newline is synthesized
    /// so the final line of an unterminated file still ends its tokens.
    pub(crate) fn feed_line(&mut self, line: &str) -> Result<()> {
        self.data.begin_line(line);
        while self.data.index < self.data.line.len() {
            dispatch(&mut self.syntax, &mut self.data)?;
            if self.data.replay {
                self.data.replay = false;
            } else {
                self.data.index += 1;
            }
        }
        Ok(())
    }

    /// End-of-input checks. Containers left open close implicitly, but an
    /// unterminated block comment or a hanging backslash continuation is
    /// an error pointing at where it began.
    pub(crate) fn finish(self) -> Result<Node> {
        for frame in self.data.scopes.iter().rev() {
            if frame.scope == Scope::NestedComment {
                return Err(self.data.parse_error_at(
                    frame.at,
                    &frame.line,
                    "unterminated nested comment, expected a matching '}'",
                ));
            }
        }
        if self.data.pending_continuation() {
            return Err(self.data.parse_error(
                "expected the string to continue on the next line but reached the end of input",
            ));
        }
        Ok(self.root)
    }
}

/// Parse a luco document from a string. The root node is always an
/// object; an empty input yields an empty object.
pub fn try_parse(source: &str) -> Result<Node> {
    let mut engine = Engine::new();
    for line in source.split_inclusive('\n') {
        engine.feed_line(line)?;
    }
    engine.finish()
}

/// Raising form of [`try_parse`].
///
/// # Panics
///
/// Panics with the error's message if the document is malformed.
pub fn parse(source: &str) -> Node {
    match try_parse(source) {
        Ok(node) => node,
        Err(e) => panic!("{e}"),
    }
}

/// Parse a luco document from raw bytes. The bytes must be valid UTF-8;
/// anything else is a `Parsing` error.
pub fn try_parse_bytes(bytes: &[u8]) -> Result<Node> {
    let source = std::str::from_utf8(bytes)
        .map_err(|e| Error::Parsing(format!("input buffer is not valid UTF-8: {e}")))?;
    try_parse(source)
}

/// Raising form of [`try_parse_bytes`].
///
/// # Panics
///
/// Panics with the error's message if the bytes are not UTF-8 or the
/// document is malformed.
pub fn parse_bytes(bytes: &[u8]) -> Node {
    match try_parse_bytes(bytes) {
        Ok(node) => node,
        Err(e) => panic!("{e}"),
    }
}

/// Parse a luco document from a file, reading it line by line. Open and
/// read failures are `Filesystem` errors carrying the OS message.
pub fn try_parse_file(path: impl AsRef<Path>) -> Result<Node> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::Filesystem(format!("couldn't open '{}': {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    let mut engine = Engine::new();
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| Error::Filesystem(format!("couldn't read '{}': {e}", path.display())))?;
        if read == 0 {
            break;
        }
        engine.feed_line(&line)?;
    }
    engine.finish()
}

/// Raising form of [`try_parse_file`].
///
/// # Panics
///
/// Panics with the error's message if the file cannot be read or the
/// document is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Node {
    match try_parse_file(path) {
        Ok(node) => node,
        Err(e) => panic!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_assignments() {
        let doc = try_parse("name = \"cat\"\n\"age\"= 5\nsmol=true\n").unwrap();
        assert_eq!(doc.at("name").as_string(), "cat");
        assert_eq!(doc.at("age").as_integer(), 5);
        assert!(doc.at("smol").as_boolean());
        assert_eq!(doc.as_object().len(), 3);
    }

    #[test]
    fn test_parse_empty_input_is_empty_object() {
        let doc = try_parse("").unwrap();
        assert!(doc.is_object());
        assert!(doc.as_object().is_empty());
        assert!(try_parse("\n  \n").unwrap().as_object().is_empty());
    }

    #[test]
    fn test_parse_array_block_with_typed_elements() {
        let doc = try_parse("list {\n  \"meow\"\n  5\n  5.0\n  true\n  null\n}\n").unwrap();
        let list = doc.at("list");
        assert!(list.is_array());
        assert_eq!(list.at_index(0).as_string(), "meow");
        assert_eq!(list.at_index(1).as_integer(), 5);
        assert_eq!(list.at_index(2).as_double(), 5.0);
        assert!(list.at_index(3).as_boolean());
        assert!(list.at_index(4).is_null());
    }

    #[test]
    fn test_parse_nested_objects() {
        let doc = try_parse(concat!(
            "server {\n",
            "    host = localhost\n",
            "    tls {\n",
            "        port = 8443\n",
            "    }\n",
            "}\n",
        ))
        .unwrap();
        assert_eq!(doc.at("server").at("host").as_string(), "localhost");
        assert_eq!(doc.at("server").at("tls").at("port").as_integer(), 8443);
    }

    #[test]
    fn test_parse_equals_brace_opens_block_too() {
        let doc = try_parse("obj = {\n  a = 1\n}\n").unwrap();
        assert_eq!(doc.at("obj").at("a").as_integer(), 1);
    }

    #[test]
    fn test_parse_array_of_arrays() {
        let doc = try_parse("matrix {\n{\n1\n2\n}\n{\n3\n}\n}\n").unwrap();
        let matrix = doc.at("matrix");
        assert_eq!(matrix.as_array().len(), 2);
        assert_eq!(matrix.at_index(0).at_index(1).as_integer(), 2);
        assert_eq!(matrix.at_index(1).at_index(0).as_integer(), 3);
    }

    #[test]
    fn test_parse_empty_block_is_empty_object() {
        let doc = try_parse("k { }\n").unwrap();
        assert!(doc.at("k").is_object());
        assert!(doc.at("k").as_object().is_empty());
    }

    #[test]
    fn test_empty_block_between_siblings() {
        let doc = try_parse("outer {\n  k { }\n  after = 1\n}\nlast = 2\n").unwrap();
        assert!(doc.at("outer").at("k").as_object().is_empty());
        assert_eq!(doc.at("outer").at("after").as_integer(), 1);
        assert_eq!(doc.at("last").as_integer(), 2);
    }

    #[test]
    fn test_key_cut_by_newline_requires_assignment() {
        let err = try_parse("justakey\nx = 1\n").unwrap_err();
        assert!(err.is_parsing());
        assert!(err.to_string().contains("expected '=' or '{'"), "{err}");
        // The '=' or '{' may still arrive on a later line.
        let doc = try_parse("late\n= 5\n").unwrap();
        assert_eq!(doc.at("late").as_integer(), 5);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(try_parse("{invalid}").unwrap_err().is_parsing());
        assert!(try_parse("{{}").unwrap_err().is_parsing());
        assert!(try_parse("}").unwrap_err().is_parsing());
        assert!(try_parse("k = 1 = 2\n").unwrap_err().is_parsing());
        assert!(try_parse("a { b = 1 }\n").unwrap_err().is_parsing());
    }

    #[test]
    fn test_error_carries_location() {
        let err = try_parse("ok = 1\n}\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("2:1\n"), "got: {msg}");
        assert!(msg.contains('^'));
    }

    #[test]
    fn test_comments_are_ignored() {
        let doc = try_parse(concat!(
            "# heading\n",
            "a = 1 # trailing\n",
            "#{ block { nested } still comment }\n",
            "b = 2\n",
        ))
        .unwrap();
        assert_eq!(doc.as_object().len(), 2);
        assert_eq!(doc.at("a").as_integer(), 1);
        assert_eq!(doc.at("b").as_integer(), 2);
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let doc = try_parse("#{\nthis = is\nall = comment\n}\nreal = 1\n").unwrap();
        assert_eq!(doc.as_object().len(), 1);
        assert_eq!(doc.at("real").as_integer(), 1);
    }

    #[test]
    fn test_unterminated_block_comment_errors() {
        let err = try_parse("#{ never closed\nx = 1\n").unwrap_err();
        assert!(err.is_parsing());
        let msg = err.to_string();
        assert!(msg.starts_with("1:2\n"), "got: {msg}");
        assert!(msg.contains("never closed"));
        assert!(msg.contains('^'));
        assert!(msg.contains("unterminated nested comment"));
    }

    #[test]
    fn test_unterminated_quote_errors() {
        assert!(try_parse("k = \"abc\n").unwrap_err().is_parsing());
        assert!(try_parse("\"key = 1\n").unwrap_err().is_parsing());
    }

    #[test]
    fn test_hanging_continuation_errors() {
        let err = try_parse("k = abc\\").unwrap_err();
        assert!(err.is_parsing());
        let msg = err.to_string();
        assert!(msg.contains("end of input"));
        assert!(msg.contains("k = abc"));
        assert!(msg.contains('^'));
    }

    #[test]
    fn test_open_containers_close_implicitly_at_eof() {
        let doc = try_parse("outer {\n  inner = 1\n").unwrap();
        assert_eq!(doc.at("outer").at("inner").as_integer(), 1);
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        assert!(try_parse_bytes(b"key = 5\n").is_ok());
        let err = try_parse_bytes(&[0x6b, 0xff, 0xfe]).unwrap_err();
        assert!(err.is_parsing());
    }

    #[test]
    fn test_integer_overflow_is_typed_parse_error() {
        let err = try_parse("big = 99999999999999999999\n").unwrap_err();
        assert!(matches!(err, Error::ParsingWrongType(_)));
    }

    #[test]
    fn test_unquoted_value_keeps_inner_spaces() {
        let doc = try_parse("k = 3 5\npath = /usr/local bin\n").unwrap();
        assert_eq!(doc.at("k").as_string(), "3 5");
        assert_eq!(doc.at("path").as_string(), "/usr/local bin");
    }

    #[test]
    fn test_keys_and_values_with_escapes() {
        let doc = try_parse("we\\{ird = a\\=b\n").unwrap();
        assert_eq!(doc.at("we{ird").as_string(), "a=b");
    }

    #[test]
    fn test_multiline_strings() {
        let doc = try_parse("a = abc\\\n   def\nb = \"ab\"\\\n\"cd\"\nc = \"xy\\\nz\"\n").unwrap();
        assert_eq!(doc.at("a").as_string(), "abcdef");
        assert_eq!(doc.at("b").as_string(), "abcd");
        assert_eq!(doc.at("c").as_string(), "xyz");
    }

    #[test]
    fn test_quoted_literals_stay_strings() {
        let doc = try_parse("a = \"5\"\nb = 'true'\nc = \"null\"\n").unwrap();
        assert_eq!(doc.at("a").as_string(), "5");
        assert_eq!(doc.at("b").as_string(), "true");
        assert_eq!(doc.at("c").as_string(), "null");
    }
}
