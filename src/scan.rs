//! Per-character string scanning: quote tracking, escapes, backslash
//! continuations, and scalar literal classification.
//!
//! Keys and values are both scanned through an [`Accumulator`]. The
//! recognizers feed it one character at a time; it answers whether the
//! character belonged to the string ([`Feed::Consumed`]) or marks a
//! boundary the recognizer has to act on ([`Feed::Delimiter`]).

use crate::error::Result;
use crate::value::{Value, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteKind {
    Single,
    Double,
}

impl QuoteKind {
    pub(crate) fn as_char(self) -> char {
        match self {
            QuoteKind::Single => '\'',
            QuoteKind::Double => '"',
        }
    }
}

/// Characters a backslash makes literal.
fn is_special(ch: char) -> bool {
    matches!(ch, '{' | '}' | '=' | '"' | '\'' | '\\')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ScanState {
    /// Nothing accumulated yet.
    #[default]
    Idle,
    /// Inside bare (unquoted) text.
    Unquoted,
    /// Inside an open quoted segment.
    Quoted(QuoteKind),
    /// The closing quote has been consumed.
    DoneQuoted(QuoteKind),
    /// A bare run was cut by a newline; nothing more may be appended.
    DoneUnquoted,
    /// Backslash at end of line in bare text; the newline and the next
    /// line's leading whitespace are absorbed.
    ContinueUnquoted,
    /// Backslash at end of line after a closed quoted segment; the next
    /// segment must re-open with the same quote.
    ContinueQuoted(QuoteKind),
    /// Backslash at end of line inside an open quoted segment; only the
    /// newline is absorbed, the quote stays open.
    ContinueOpen(QuoteKind),
}

/// What [`Accumulator::feed`] did with a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Feed {
    /// The character belongs to the string (or was quote/escape
    /// machinery) and has been absorbed.
    Consumed,
    /// The character is not part of the string; the recognizer decides
    /// what it means.
    Delimiter,
}

/// Incremental scanner for one key or scalar literal.
#[derive(Debug, Clone, Default)]
pub(crate) struct Accumulator {
    pub(crate) text: String,
    pub(crate) state: ScanState,
    escape_pending: bool,
}

impl Accumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// No content has been accumulated yet.
    pub(crate) fn is_idle(&self) -> bool {
        self.state == ScanState::Idle
    }

    /// A quote is open; delimiters and dispatch are inert until it closes.
    pub(crate) fn in_open_quote(&self) -> bool {
        matches!(
            self.state,
            ScanState::Quoted(_) | ScanState::ContinueOpen(_)
        )
    }

    /// A backslash continuation is waiting for the next line.
    pub(crate) fn in_continuation(&self) -> bool {
        matches!(
            self.state,
            ScanState::ContinueUnquoted
                | ScanState::ContinueQuoted(_)
                | ScanState::ContinueOpen(_)
        )
    }

    /// The accumulated text may legally end here: bare text, a closed
    /// quote, or nothing at all, with no escape half-consumed.
    pub(crate) fn is_terminable(&self) -> bool {
        !self.escape_pending
            && matches!(
                self.state,
                ScanState::Idle
                    | ScanState::Unquoted
                    | ScanState::DoneQuoted(_)
                    | ScanState::DoneUnquoted
            )
    }

    /// Any quoted segment was involved, which pins the scalar type to
    /// string and disables trailing-whitespace stripping.
    pub(crate) fn was_quoted(&self) -> bool {
        matches!(
            self.state,
            ScanState::Quoted(_)
                | ScanState::DoneQuoted(_)
                | ScanState::ContinueQuoted(_)
                | ScanState::ContinueOpen(_)
        )
    }

    /// The closing quote has been consumed and nothing followed it.
    pub(crate) fn ended_quoted(&self) -> bool {
        matches!(self.state, ScanState::DoneQuoted(_))
    }

    /// The text has ended, either by its closing quote or by a newline
    /// cutting a bare run. For a key, only `=` or `{` may legally follow.
    pub(crate) fn ended(&self) -> bool {
        matches!(
            self.state,
            ScanState::DoneQuoted(_) | ScanState::DoneUnquoted
        )
    }

    /// The quote a closed-quote continuation is waiting to re-open.
    pub(crate) fn continuation_quote(&self) -> Option<QuoteKind> {
        match self.state {
            ScanState::ContinueQuoted(k) => Some(k),
            _ => None,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn take(&mut self) -> Accumulator {
        std::mem::take(self)
    }

    /// The final text: quoted content verbatim, bare content with
    /// trailing spaces and tabs stripped.
    pub(crate) fn finish(&self) -> String {
        if self.was_quoted() {
            self.text.clone()
        } else {
            self.text.trim_end_matches([' ', '\t']).to_string()
        }
    }

    /// Advance the scanner by one character. `next` is one character of
    /// lookahead on the same line, used for escapes, doubled quotes, and
    /// end-of-line continuations.
    pub(crate) fn feed(&mut self, ch: char, next: Option<char>) -> Feed {
        if self.escape_pending {
            self.escape_pending = false;
            self.text.push(ch);
            return Feed::Consumed;
        }
        match self.state {
            ScanState::Idle => match ch {
                ' ' | '\t' | '\n' | '{' | '}' | '=' | '#' => Feed::Delimiter,
                '\'' => {
                    self.state = ScanState::Quoted(QuoteKind::Single);
                    Feed::Consumed
                }
                '"' => {
                    self.state = ScanState::Quoted(QuoteKind::Double);
                    Feed::Consumed
                }
                '\\' => self.backslash(next, ScanState::Unquoted, ScanState::ContinueUnquoted),
                _ => {
                    self.state = ScanState::Unquoted;
                    self.text.push(ch);
                    Feed::Consumed
                }
            },
            ScanState::Unquoted => match ch {
                '\n' => {
                    self.state = ScanState::DoneUnquoted;
                    Feed::Consumed
                }
                '{' | '}' | '=' | '#' => Feed::Delimiter,
                '\\' => self.backslash(next, ScanState::Unquoted, ScanState::ContinueUnquoted),
                _ => {
                    self.text.push(ch);
                    Feed::Consumed
                }
            },
            ScanState::Quoted(k) => {
                if ch == k.as_char() {
                    if next == Some(k.as_char()) {
                        // Doubled quote: drop this one, keep the next
                        // verbatim.
                        self.escape_pending = true;
                    } else {
                        self.state = ScanState::DoneQuoted(k);
                    }
                    Feed::Consumed
                } else if ch == '\\' {
                    self.backslash(next, ScanState::Quoted(k), ScanState::ContinueOpen(k))
                } else if ch == '\n' {
                    Feed::Delimiter
                } else {
                    self.text.push(ch);
                    Feed::Consumed
                }
            }
            ScanState::DoneQuoted(k) => match ch {
                ' ' | '\t' => Feed::Consumed,
                '\\' if matches!(next, Some('\n') | None) => {
                    self.state = ScanState::ContinueQuoted(k);
                    Feed::Consumed
                }
                _ => Feed::Delimiter,
            },
            ScanState::DoneUnquoted => match ch {
                ' ' | '\t' => Feed::Consumed,
                _ => Feed::Delimiter,
            },
            ScanState::ContinueUnquoted => match ch {
                '\n' | ' ' | '\t' => Feed::Consumed,
                '\\' => self.backslash(next, ScanState::Unquoted, ScanState::ContinueUnquoted),
                _ => {
                    self.state = ScanState::Unquoted;
                    self.text.push(ch);
                    Feed::Consumed
                }
            },
            ScanState::ContinueQuoted(k) => match ch {
                '\n' | ' ' | '\t' => Feed::Consumed,
                c if c == k.as_char() => {
                    self.state = ScanState::Quoted(k);
                    Feed::Consumed
                }
                _ => Feed::Delimiter,
            },
            ScanState::ContinueOpen(k) => {
                self.state = ScanState::Quoted(k);
                if ch != '\n' {
                    self.text.push(ch);
                }
                Feed::Consumed
            }
        }
    }

    fn backslash(&mut self, next: Option<char>, literal: ScanState, cont: ScanState) -> Feed {
        match next {
            Some(c) if is_special(c) => {
                self.escape_pending = true;
                self.state = literal;
            }
            Some('\n') | None => {
                self.state = cont;
            }
            _ => {
                self.text.push('\\');
                self.state = literal;
            }
        }
        Feed::Consumed
    }

    /// The typed scalar this accumulator holds. Quoted content is always
    /// a string; bare content goes through literal classification.
    pub(crate) fn to_value(&self) -> Result<Value> {
        if self.was_quoted() {
            Ok(Value::String(self.text.clone()))
        } else {
            infer_scalar(&self.finish())
        }
    }
}

/// Classify a bare literal: `null`, `true`/`on`, `false`/`off`, all
/// digits as integer, digits with exactly one dot as double, anything
/// else as string. Digit strings that overflow `i64` are a
/// `ParsingWrongType` error rather than silently becoming strings.
pub(crate) fn infer_scalar(raw: &str) -> Result<Value> {
    match raw {
        "null" => return Ok(Value::Null),
        "true" | "on" => return Ok(Value::Bool(true)),
        "false" | "off" => return Ok(Value::Bool(false)),
        _ => {}
    }
    let mut digits = 0usize;
    let mut dots = 0usize;
    let mut numeric_shape = !raw.is_empty();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits += 1;
        } else if c == '.' {
            dots += 1;
        } else {
            numeric_shape = false;
            break;
        }
    }
    if numeric_shape && digits > 0 && dots <= 1 {
        if dots == 0 {
            Value::from_typed_str(raw, ValueType::Integer)
        } else {
            Value::from_typed_str(raw, ValueType::Double)
        }
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(acc: &mut Accumulator, input: &str) {
        let chars: Vec<char> = input.chars().collect();
        for (i, &ch) in chars.iter().enumerate() {
            acc.feed(ch, chars.get(i + 1).copied());
        }
    }

    #[test]
    fn test_unquoted_trims_trailing_whitespace() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "localhost  ");
        assert_eq!(acc.finish(), "localhost");
        assert!(!acc.was_quoted());
    }

    #[test]
    fn test_quoted_keeps_whitespace_and_delimiters() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "\"a = {b} \"");
        assert_eq!(acc.state, ScanState::DoneQuoted(QuoteKind::Double));
        assert_eq!(acc.finish(), "a = {b} ");
        assert!(acc.was_quoted());
    }

    #[test]
    fn test_doubled_quote_is_literal() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "\"val\"\"ue\"");
        assert_eq!(acc.finish(), "val\"ue");
        assert!(acc.is_terminable());
    }

    #[test]
    fn test_backslash_escapes_delimiters() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "we\\{ird\\}");
        assert_eq!(acc.finish(), "we{ird}");
        // Unescaped '=' is a delimiter.
        assert_eq!(acc.feed('=', None), Feed::Delimiter);
    }

    #[test]
    fn test_unquoted_continuation_joins_lines() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "abc\\\n   def");
        assert_eq!(acc.finish(), "abcdef");
        assert_eq!(acc.state, ScanState::Unquoted);
    }

    #[test]
    fn test_closed_quote_continuation_requires_reopen() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "\"ab\"\\\n  \"cd\"");
        assert_eq!(acc.finish(), "abcd");
        assert_eq!(acc.state, ScanState::DoneQuoted(QuoteKind::Double));

        let mut bad = Accumulator::new();
        feed_all(&mut bad, "\"ab\"\\\n  ");
        assert_eq!(bad.feed('x', None), Feed::Delimiter);
    }

    #[test]
    fn test_open_quote_continuation_absorbs_newline_only() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "\"ab\\\ncd\"");
        assert_eq!(acc.finish(), "abcd");
        assert_eq!(acc.state, ScanState::DoneQuoted(QuoteKind::Double));
    }

    #[test]
    fn test_newline_in_open_quote_is_delimiter() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "\"ab");
        assert_eq!(acc.feed('\n', None), Feed::Delimiter);
        assert!(acc.in_open_quote());
    }

    #[test]
    fn test_newline_ends_bare_run() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "key");
        assert_eq!(acc.feed('\n', None), Feed::Consumed);
        assert!(acc.ended());
        assert!(acc.is_terminable());
        assert_eq!(acc.feed(' ', None), Feed::Consumed);
        assert_eq!(acc.feed('x', None), Feed::Delimiter);
        assert_eq!(acc.finish(), "key");
    }

    #[test]
    fn test_infer_scalar_literals() {
        assert_eq!(infer_scalar("null").unwrap(), Value::Null);
        assert_eq!(infer_scalar("on").unwrap(), Value::Bool(true));
        assert_eq!(infer_scalar("off").unwrap(), Value::Bool(false));
        assert_eq!(infer_scalar("8080").unwrap(), Value::Integer(8080));
        assert_eq!(infer_scalar("1.5").unwrap(), Value::Float(1.5));
        assert_eq!(infer_scalar("1.2.3").unwrap(), Value::String("1.2.3".into()));
        assert_eq!(infer_scalar(".").unwrap(), Value::String(".".into()));
        assert_eq!(infer_scalar("-5").unwrap(), Value::String("-5".into()));
        assert_eq!(infer_scalar("").unwrap(), Value::String(String::new()));
        assert!(infer_scalar("99999999999999999999").is_err());
    }

    #[test]
    fn test_quoted_digits_stay_strings() {
        let mut acc = Accumulator::new();
        feed_all(&mut acc, "\"5\"");
        assert_eq!(acc.to_value().unwrap(), Value::String("5".into()));
    }
}
