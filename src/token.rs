//! The five token recognizers. Each one looks at the current character
//! plus the scope stack and either claims the character or passes. The
//! dispatcher tries them in a fixed order: comment, key, value, opening
//! bracket, closing bracket; anything unclaimed falls to the stray
//! classifier in `parser.rs`.

use crate::context::{ParseData, Scope};
use crate::error::Result;
use crate::node::NodeType;
use crate::scan::{Accumulator, Feed};

/// Whether a recognizer claimed the current character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Handled,
    Pass,
}

/// Characters that may start a key. Structural characters and whitespace
/// cannot, but a backslash can (it escapes whatever follows), and spaces
/// are legal inside a key once it has started.
fn can_start_key(ch: char) -> bool {
    !matches!(ch, ' ' | '\t' | '\n' | '{' | '}' | '=')
}

/// Characters that may start a value. `{` is allowed: it turns the value
/// position into an ambiguous block.
fn can_start_value(ch: char) -> bool {
    !matches!(ch, ' ' | '\t' | '\n' | '}' | '=')
}

/// `#` comments: line comments run to the newline, which is replayed so
/// the construct before the comment still sees it. An unescaped `{`
/// inside a line comment upgrades it to a block comment that ends at the
/// balancing `}` and may span lines.
#[derive(Debug, Default)]
pub(crate) struct CommentToken {
    depth: u64,
}

impl CommentToken {
    pub(crate) fn handle(&mut self, data: &mut ParseData) -> Result<Outcome> {
        let ch = data.ch();
        match data.top() {
            Some(Scope::Comment) => {
                if ch == '\n' {
                    data.pop_scope();
                    data.replay = true;
                } else if ch == '{' {
                    data.pop_scope();
                    data.push_scope(Scope::NestedComment);
                    self.depth = 0;
                }
                Ok(Outcome::Handled)
            }
            Some(Scope::NestedComment) => {
                match ch {
                    '{' => self.depth += 1,
                    '}' => {
                        if self.depth == 0 {
                            data.pop_scope();
                        } else {
                            self.depth -= 1;
                        }
                    }
                    _ => {}
                }
                Ok(Outcome::Handled)
            }
            _ => {
                if ch == '#' && !data.active_in_open_quote() {
                    data.push_scope(Scope::Comment);
                    Ok(Outcome::Handled)
                } else {
                    Ok(Outcome::Pass)
                }
            }
        }
    }
}

/// Keys: started by any legal first character while an object scope is on
/// top, ended by an unescaped `=` (assignment) or `{` (block). A newline
/// cuts the key's text; the `=` or `{` may still follow on a later line,
/// but any other character is a syntax error.
#[derive(Debug, Default)]
pub(crate) struct KeyToken;

impl KeyToken {
    pub(crate) fn handle(&mut self, data: &mut ParseData) -> Result<Outcome> {
        let ch = data.ch();
        if data.top() == Some(Scope::Object) && can_start_key(ch) {
            data.push_scope(Scope::Key);
            data.keys.push(Accumulator::new());
        }
        if data.top() != Some(Scope::Key) {
            return Ok(Outcome::Pass);
        }

        let quote_breaks = data
            .keys
            .last()
            .map(|acc| acc.in_open_quote() && !acc.in_continuation())
            .unwrap_or(false);
        if ch == '\n' && quote_breaks {
            return Err(data.parse_error("unterminated quoted string in key"));
        }

        let terminable = data
            .keys
            .last()
            .map(Accumulator::is_terminable)
            .unwrap_or(false);
        if matches!(ch, '=' | '{') && terminable {
            data.pop_scope(); // Key
            data.push_scope(if ch == '=' {
                Scope::EqualSign
            } else {
                Scope::OpeningBracket
            });
            return Ok(Outcome::Handled);
        }

        let next = data.peek();
        match data.keys.last_mut() {
            Some(acc) => match acc.feed(ch, next) {
                Feed::Consumed => Ok(Outcome::Handled),
                Feed::Delimiter => Ok(Outcome::Pass),
            },
            None => Ok(Outcome::Pass),
        }
    }
}

/// Scalar values in assignment or array position, plus the flush of a
/// pending bare array element.
#[derive(Debug, Default)]
pub(crate) struct ValueToken;

impl ValueToken {
    pub(crate) fn handle(&mut self, data: &mut ParseData) -> Result<Outcome> {
        let ch = data.ch();
        match data.top() {
            Some(Scope::EqualSign) if can_start_value(ch) => {
                data.pop_scope(); // EqualSign
                data.push_scope(Scope::Value);
            }
            Some(Scope::Array) if can_start_value(ch) => {
                data.push_scope(Scope::Value);
            }
            Some(Scope::FlushValue) => {
                // The previous line's content turned out to be a bare
                // array element. Store it, then re-dispatch the current
                // character against the array scope.
                data.insert_scalar()?;
                data.pop_scope();
                data.replay = true;
                return Ok(Outcome::Handled);
            }
            _ => {}
        }
        if data.top() != Some(Scope::Value) {
            return Ok(Outcome::Pass);
        }

        if ch == '\n' && data.raw.in_open_quote() && !data.raw.in_continuation() {
            return Err(data.parse_error("unterminated quoted string in value"));
        }
        if ch == '\n' && data.raw.is_terminable() {
            data.insert_scalar()?;
            data.pop_scope(); // Value
            return Ok(Outcome::Handled);
        }

        let next = data.peek();
        match data.raw.feed(ch, next) {
            Feed::Consumed => Ok(Outcome::Handled),
            Feed::Delimiter if ch == '{' => {
                // A block opens in value position. Anything scanned so
                // far is stored first, then the brace goes ambiguous.
                data.pop_scope(); // Value
                if !data.raw.is_idle() {
                    data.insert_scalar()?;
                }
                data.push_scope(Scope::TransientBracket);
                Ok(Outcome::Handled)
            }
            Feed::Delimiter => Ok(Outcome::Pass),
        }
    }
}

/// The ambiguous `{` after a key. Content accumulates into the raw
/// scanner until one of three resolutions:
///
/// - `=`   : the block is an object and the content is its first key;
/// - `{`   : with content, a nested object block; with none, an array of
///           arrays (the inner brace goes ambiguous in turn);
/// - newline with content: the block is an array and the content is its
///   first element, flushed by the next dispatch.
///
/// A newline with no content keeps the block ambiguous.
#[derive(Debug, Default)]
pub(crate) struct OpeningBracketToken;

impl OpeningBracketToken {
    pub(crate) fn handle(&mut self, data: &mut ParseData) -> Result<Outcome> {
        let ch = data.ch();
        if data.top() == Some(Scope::OpeningBracket) {
            data.pop_scope();
            data.push_scope(Scope::TransientBracket);
        }
        if data.top() != Some(Scope::TransientBracket) {
            return Ok(Outcome::Pass);
        }

        if ch == '\n' && data.raw.in_open_quote() && !data.raw.in_continuation() {
            return Err(data.parse_error("unterminated quoted string in block"));
        }

        if matches!(ch, '=' | '{' | '\n') && data.raw.is_terminable() {
            if ch == '\n' && data.raw.is_idle() {
                return Ok(Outcome::Handled);
            }
            data.pop_scope(); // TransientBracket
            match ch {
                '=' => {
                    data.push_scope(Scope::Object);
                    data.push_scope(Scope::EqualSign);
                    data.open_container(NodeType::Object)?;
                    let pending_key = data.raw.take();
                    data.keys.push(pending_key);
                }
                '{' if !data.raw.is_idle() => {
                    data.push_scope(Scope::Object);
                    data.push_scope(Scope::OpeningBracket);
                    data.open_container(NodeType::Object)?;
                    let pending_key = data.raw.take();
                    data.keys.push(pending_key);
                }
                '{' => {
                    data.push_scope(Scope::Array);
                    data.open_container(NodeType::Array)?;
                    data.push_scope(Scope::TransientBracket);
                }
                _ => {
                    data.push_scope(Scope::Array);
                    data.open_container(NodeType::Array)?;
                    data.push_scope(Scope::FlushValue);
                }
            }
            return Ok(Outcome::Handled);
        }

        let next = data.peek();
        match data.raw.feed(ch, next) {
            Feed::Consumed => Ok(Outcome::Handled),
            Feed::Delimiter => Ok(Outcome::Pass),
        }
    }
}

/// `}` closing the innermost container, or closing an ambiguous block as
/// an empty object.
#[derive(Debug, Default)]
pub(crate) struct ClosingBracketToken;

impl ClosingBracketToken {
    pub(crate) fn handle(&mut self, data: &mut ParseData) -> Result<Outcome> {
        if data.ch() != '}' {
            return Ok(Outcome::Pass);
        }
        match data.top() {
            Some(Scope::Object) | Some(Scope::Array) => {
                if let Some(slot) = data.keys.last_mut() {
                    slot.reset();
                }
                data.pop_scope();
                if data.scopes.is_empty() {
                    return Err(
                        data.parse_error("the number of '}' is more than the number of '{'")
                    );
                }
                if data.top() == Some(Scope::Object) {
                    data.keys.pop();
                }
                if data.nodes.len() > 1 {
                    data.nodes.pop();
                }
                Ok(Outcome::Handled)
            }
            Some(Scope::TransientBracket) => {
                if !data.raw.is_idle() {
                    return Err(data.parse_error(
                        "expected '=', '{', or a newline after the block's content but found '}'",
                    ));
                }
                data.pop_scope();
                data.insert_empty_object()?;
                Ok(Outcome::Handled)
            }
            _ => Ok(Outcome::Pass),
        }
    }
}

/// The recognizer set threaded through a whole parse; only the comment
/// recognizer carries state across characters.
#[derive(Debug, Default)]
pub(crate) struct Syntax {
    pub(crate) comment: CommentToken,
    pub(crate) key: KeyToken,
    pub(crate) value: ValueToken,
    pub(crate) opening: OpeningBracketToken,
    pub(crate) closing: ClosingBracketToken,
}
