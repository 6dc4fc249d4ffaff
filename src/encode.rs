//! Serializers: document tree to luco text and to JSON text.

use crate::container::Array;
use crate::node::Node;
use crate::value::Value;

/// Indentation for the dump family: one character repeated `width` times
/// per nesting level. The default is four spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub ch: char,
    pub width: usize,
}

impl Default for Indent {
    fn default() -> Self {
        Indent { ch: ' ', width: 4 }
    }
}

impl Indent {
    pub fn new(ch: char, width: usize) -> Self {
        Indent { ch, width }
    }

    fn pad(&self, depth: usize) -> String {
        std::iter::repeat(self.ch)
            .take(self.width * depth)
            .collect()
    }
}

/// Quote and escape a string for luco output: embedded quotes and
/// backslashes get a backslash, everything else is verbatim.
fn luco_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Keys print bare when they can be scanned back bare; anything with
/// structural characters, quotes, or edge whitespace gets quoted.
fn luco_key(key: &str) -> String {
    let needs_quote = key.is_empty()
        || key.starts_with([' ', '\t'])
        || key.ends_with([' ', '\t'])
        || key
            .chars()
            .any(|c| matches!(c, '{' | '}' | '=' | '#' | '"' | '\'' | '\\' | '\n'));
    if needs_quote {
        luco_quote(key)
    } else {
        key.to_string()
    }
}

/// Scalars in luco output: strings always quoted so their type survives a
/// round trip, everything else in canonical literal form.
fn luco_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => luco_quote(s),
        Value::Empty => luco_quote(""),
        other => other.stringify(),
    }
}

fn luco_entry(key: &str, child: &Node, indent: Indent, depth: usize, out: &mut String) {
    out.push_str(&indent.pad(depth));
    out.push_str(&luco_key(key));
    if let Ok(obj) = child.try_as_object() {
        out.push_str(" {\n");
        for (k, c) in obj.iter() {
            luco_entry(k, c, indent, depth + 1, out);
        }
        out.push_str(&indent.pad(depth));
        out.push_str("}\n");
    } else if let Ok(arr) = child.try_as_array() {
        out.push_str(" {\n");
        luco_items(&arr, indent, depth + 1, out);
        out.push_str(&indent.pad(depth));
        out.push_str("}\n");
    } else if let Ok(v) = child.try_as_value() {
        out.push_str(" = ");
        out.push_str(&luco_scalar(&v));
        out.push('\n');
    }
}

fn luco_items(arr: &Array, indent: Indent, depth: usize, out: &mut String) {
    for item in arr.iter() {
        if let Ok(nested) = item.try_as_array() {
            out.push_str(&indent.pad(depth));
            out.push_str("{\n");
            luco_items(&nested, indent, depth + 1, out);
            out.push_str(&indent.pad(depth));
            out.push_str("}\n");
        } else if let Ok(obj) = item.try_as_object() {
            out.push_str(&indent.pad(depth));
            out.push_str("{\n");
            for (k, c) in obj.iter() {
                luco_entry(k, c, indent, depth + 1, out);
            }
            out.push_str(&indent.pad(depth));
            out.push_str("}\n");
        } else if let Ok(v) = item.try_as_value() {
            out.push_str(&indent.pad(depth));
            out.push_str(&luco_scalar(&v));
            out.push('\n');
        }
    }
}

/// Serialize a tree to luco text. The root object prints without braces,
/// matching the implicit top-level object of the input syntax.
pub(crate) fn to_luco_string(node: &Node, indent: Indent) -> String {
    let mut out = String::new();
    if let Ok(obj) = node.try_as_object() {
        for (key, child) in obj.iter() {
            luco_entry(key, child, indent, 0, &mut out);
        }
    } else if let Ok(arr) = node.try_as_array() {
        out.push_str("{\n");
        luco_items(&arr, indent, 1, &mut out);
        out.push_str("}\n");
    } else if let Ok(v) = node.try_as_value() {
        out.push_str(&luco_scalar(&v));
        out.push('\n');
    }
    out
}

/// Escape a string per JSON rules.
fn json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Scalars in JSON output. Empty values and non-finite doubles have no
/// JSON form and print as null.
fn json_scalar(value: &Value) -> String {
    match value {
        Value::Empty | Value::Null => "null".to_string(),
        Value::Float(f) if !f.is_finite() => "null".to_string(),
        Value::String(s) => json_string(s),
        other => other.stringify(),
    }
}

fn json_node(node: &Node, indent: Indent, depth: usize, out: &mut String) {
    if let Ok(obj) = node.try_as_object() {
        if obj.is_empty() {
            out.push_str("{}");
            return;
        }
        out.push_str("{\n");
        let last = obj.len() - 1;
        for (i, (key, child)) in obj.iter().enumerate() {
            out.push_str(&indent.pad(depth + 1));
            out.push_str(&json_string(key));
            out.push_str(": ");
            json_node(child, indent, depth + 1, out);
            if i != last {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str(&indent.pad(depth));
        out.push('}');
    } else if let Ok(arr) = node.try_as_array() {
        if arr.is_empty() {
            out.push_str("[]");
            return;
        }
        out.push_str("[\n");
        let last = arr.len() - 1;
        for (i, item) in arr.iter().enumerate() {
            out.push_str(&indent.pad(depth + 1));
            json_node(item, indent, depth + 1, out);
            if i != last {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str(&indent.pad(depth));
        out.push(']');
    } else if let Ok(v) = node.try_as_value() {
        out.push_str(&json_scalar(&v));
    }
}

/// Serialize a tree to pretty-printed JSON text with a trailing newline.
pub(crate) fn to_json_string(node: &Node, indent: Indent) -> String {
    let mut out = String::new();
    json_node(node, indent, 0, &mut out);
    out.push('\n');
    out
}
