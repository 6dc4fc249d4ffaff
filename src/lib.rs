//! luco is a small configuration format with an implicit top-level
//! object, `key = value` assignments, brace-delimited nested objects and
//! arrays, typed scalars, and `#` comments.
//!
//! ```text
//! # a luco document
//! name = "cat"
//! smol = true
//! server {
//!     host = localhost
//!     port = 8080
//! }
//! tags {
//!     "fast"
//!     "tiny"
//! }
//! ```
//!
//! # Parsing Pipeline
//!
//! The parser is character driven: each character of each line is offered
//! to five token recognizers (comment, key, value, opening bracket,
//! closing bracket) in a fixed priority order, against a stack of scopes
//! that tracks what construct the cursor is inside of. A `{` is ambiguous
//! when it appears; whether it opens an object or an array is decided by
//! the first `=`, `{`, or content-carrying newline inside it.
//!
//! Parsing produces a [`Node`] tree: reference-counted handles over
//! objects (key-sorted maps), arrays, and scalar [`Value`]s. Handles
//! alias, so a node fetched with [`Node::at`] can mutate the tree in
//! place. Trees serialize back to luco text or to JSON with the
//! [`Node::dump_to_string`] family.
//!
//! ```
//! let config = luco::try_parse("port = 8080\nname = \"web\"\n").unwrap();
//! assert_eq!(config.at("port").as_integer(), 8080);
//!
//! config.insert("tls", true).unwrap();
//! let text = config.dump_to_string(luco::Indent::default());
//! assert!(text.contains("tls = true"));
//! ```

mod container;
mod context;
mod encode;
mod error;
mod node;
mod parser;
mod scan;
mod token;
mod value;

pub use container::{Array, Object};
pub use encode::Indent;
pub use error::{Error, Location, Result};
pub use node::{Node, NodeType};
pub use parser::{parse, parse_bytes, parse_file, try_parse, try_parse_bytes, try_parse_file};
pub use value::{Value, ValueType};
