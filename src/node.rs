//! The document tree node: a shared handle over a value, array, or object.

use std::cell::{Ref, RefCell, RefMut};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use crate::container::{Array, Object};
use crate::encode::{self, Indent};
use crate::error::{Error, Result};
use crate::value::{Value, ValueType};

/// The three kinds of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Value(Value),
    Array(Array),
    Object(Object),
}

fn kind_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Value(_) => "value",
        NodeKind::Array(_) => "array",
        NodeKind::Object(_) => "object",
    }
}

fn wrong_cast(from: &str, to: &str) -> Error {
    Error::WrongType(format!(
        "wrong type: trying to cast a '{from}' node to '{to}'"
    ))
}

/// A node of the document tree.
///
/// `Node` is a reference-counted handle: `Clone` produces an alias of the
/// same node, and [`Node::set`] writes through the shared cell, so a handle
/// obtained from [`Node::try_at`], [`Node::insert`], or [`Node::push_back`]
/// can be used to mutate the tree in place. Handles stay valid no matter
/// how the surrounding containers grow. Equality ([`PartialEq`]) compares
/// content deeply; use [`Node::deep_clone`] to detach a subtree.
///
/// ```
/// let config = luco::parse("port = 8080\n");
/// let port = config.at("port");
/// port.set(9090);
/// assert_eq!(config.at("port").as_integer(), 9090);
/// ```
#[derive(Clone)]
pub struct Node {
    inner: Rc<RefCell<NodeKind>>,
}

impl Node {
    pub(crate) fn from_kind(kind: NodeKind) -> Node {
        Node {
            inner: Rc::new(RefCell::new(kind)),
        }
    }

    /// A fresh node holding an empty object, ready for [`Node::insert`].
    pub fn new() -> Node {
        Node::from_kind(NodeKind::Object(Object::new()))
    }

    /// A fresh node of the given kind: an empty object, an empty array,
    /// or an empty value.
    pub fn with_kind(kind: NodeType) -> Node {
        Node::from_kind(match kind {
            NodeType::Object => NodeKind::Object(Object::new()),
            NodeType::Array => NodeKind::Array(Array::new()),
            NodeType::Value => NodeKind::Value(Value::Empty),
        })
    }

    /// Build an object node from key/content pairs.
    pub fn from_pairs<K, N, I>(pairs: I) -> Node
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<Node>,
    {
        let mut obj = Object::new();
        for (key, content) in pairs {
            obj.insert(key, content.into());
        }
        Node::from_kind(NodeKind::Object(obj))
    }

    /// Build an array node from a sequence of contents.
    pub fn from_values<N, I>(values: I) -> Node
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        let mut arr = Array::new();
        for content in values {
            arr.push_back(content.into());
        }
        Node::from_kind(NodeKind::Array(arr))
    }

    pub fn node_type(&self) -> NodeType {
        match &*self.inner.borrow() {
            NodeKind::Value(_) => NodeType::Value,
            NodeKind::Array(_) => NodeType::Array,
            NodeKind::Object(_) => NodeType::Object,
        }
    }

    /// Human-readable kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        kind_name(&self.inner.borrow())
    }

    /// The scalar type held by a value node, or [`ValueType::None`] for
    /// containers.
    pub fn value_type(&self) -> ValueType {
        match &*self.inner.borrow() {
            NodeKind::Value(v) => v.value_type(),
            _ => ValueType::None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Array(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Value(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Value(v) if v.is_string())
    }

    pub fn is_integer(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Value(v) if v.is_integer())
    }

    pub fn is_double(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Value(v) if v.is_double())
    }

    pub fn is_number(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Value(v) if v.is_number())
    }

    pub fn is_boolean(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Value(v) if v.is_boolean())
    }

    pub fn is_null(&self) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Value(v) if v.is_null())
    }

    /// Borrow the object content for iteration or lookup.
    ///
    /// The returned guard keeps the node immutably borrowed; drop it
    /// before mutating the same node through another handle.
    pub fn try_as_object(&self) -> Result<Ref<'_, Object>> {
        let name = self.type_name();
        Ref::filter_map(self.inner.borrow(), |kind| match kind {
            NodeKind::Object(obj) => Some(obj),
            _ => None,
        })
        .map_err(|_| wrong_cast(name, "object"))
    }

    /// Mutably borrow the object content.
    pub fn try_as_object_mut(&self) -> Result<RefMut<'_, Object>> {
        let name = self.type_name();
        RefMut::filter_map(self.inner.borrow_mut(), |kind| match kind {
            NodeKind::Object(obj) => Some(obj),
            _ => None,
        })
        .map_err(|_| wrong_cast(name, "object"))
    }

    /// Borrow the array content for iteration or index access.
    pub fn try_as_array(&self) -> Result<Ref<'_, Array>> {
        let name = self.type_name();
        Ref::filter_map(self.inner.borrow(), |kind| match kind {
            NodeKind::Array(arr) => Some(arr),
            _ => None,
        })
        .map_err(|_| wrong_cast(name, "array"))
    }

    /// Mutably borrow the array content.
    pub fn try_as_array_mut(&self) -> Result<RefMut<'_, Array>> {
        let name = self.type_name();
        RefMut::filter_map(self.inner.borrow_mut(), |kind| match kind {
            NodeKind::Array(arr) => Some(arr),
            _ => None,
        })
        .map_err(|_| wrong_cast(name, "array"))
    }

    /// Borrow the scalar content of a value node.
    pub fn try_as_value(&self) -> Result<Ref<'_, Value>> {
        let name = self.type_name();
        Ref::filter_map(self.inner.borrow(), |kind| match kind {
            NodeKind::Value(v) => Some(v),
            _ => None,
        })
        .map_err(|_| wrong_cast(name, "value"))
    }

    /// Panicking form of [`Node::try_as_object`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message if the node is not an object.
    pub fn as_object(&self) -> Ref<'_, Object> {
        match self.try_as_object() {
            Ok(obj) => obj,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Node::try_as_array`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message if the node is not an array.
    pub fn as_array(&self) -> Ref<'_, Array> {
        match self.try_as_array() {
            Ok(arr) => arr,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_as_string(&self) -> Result<String> {
        match &*self.inner.borrow() {
            NodeKind::Value(v) => v.try_as_string(),
            other => Err(wrong_cast(kind_name(other), "string")),
        }
    }

    pub fn try_as_integer(&self) -> Result<i64> {
        match &*self.inner.borrow() {
            NodeKind::Value(v) => v.try_as_integer(),
            other => Err(wrong_cast(kind_name(other), "integer")),
        }
    }

    pub fn try_as_double(&self) -> Result<f64> {
        match &*self.inner.borrow() {
            NodeKind::Value(v) => v.try_as_double(),
            other => Err(wrong_cast(kind_name(other), "double")),
        }
    }

    pub fn try_as_number(&self) -> Result<f64> {
        match &*self.inner.borrow() {
            NodeKind::Value(v) => v.try_as_number(),
            other => Err(wrong_cast(kind_name(other), "number")),
        }
    }

    pub fn try_as_boolean(&self) -> Result<bool> {
        match &*self.inner.borrow() {
            NodeKind::Value(v) => v.try_as_boolean(),
            other => Err(wrong_cast(kind_name(other), "boolean")),
        }
    }

    /// Panicking form of [`Node::try_as_string`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message on a non-string node.
    pub fn as_string(&self) -> String {
        match self.try_as_string() {
            Ok(s) => s,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Node::try_as_integer`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message on a non-integer node.
    pub fn as_integer(&self) -> i64 {
        match self.try_as_integer() {
            Ok(i) => i,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Node::try_as_double`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message on a non-double node.
    pub fn as_double(&self) -> f64 {
        match self.try_as_double() {
            Ok(f) => f,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Node::try_as_number`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message on a non-numeric node.
    pub fn as_number(&self) -> f64 {
        match self.try_as_number() {
            Ok(f) => f,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Node::try_as_boolean`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message on a non-boolean node.
    pub fn as_boolean(&self) -> bool {
        match self.try_as_boolean() {
            Ok(b) => b,
            Err(e) => panic!("{e}"),
        }
    }

    /// Insert `content` under `key`, replacing any existing entry.
    /// Returns a handle to the stored node, or `WrongType` if this node
    /// is not an object.
    pub fn insert(&self, key: impl Into<String>, content: impl Into<Node>) -> Result<Node> {
        let node = content.into();
        match &mut *self.inner.borrow_mut() {
            NodeKind::Object(obj) => Ok(obj.insert(key, node)),
            other => Err(Error::WrongType(format!(
                "wrong type: trying to insert a key into a '{}' node",
                kind_name(other)
            ))),
        }
    }

    /// Append `content` to the array. Returns a handle to the stored
    /// node, or `WrongType` if this node is not an array.
    pub fn push_back(&self, content: impl Into<Node>) -> Result<Node> {
        let node = content.into();
        match &mut *self.inner.borrow_mut() {
            NodeKind::Array(arr) => Ok(arr.push_back(node)),
            other => Err(Error::WrongType(format!(
                "wrong type: trying to push into a '{}' node",
                kind_name(other)
            ))),
        }
    }

    /// Look up `key`, returning an aliasing handle to the child.
    pub fn try_at(&self, key: &str) -> Result<Node> {
        match &*self.inner.borrow() {
            NodeKind::Object(obj) => obj
                .get(key)
                .cloned()
                .ok_or_else(|| Error::KeyNotFound(key.to_string())),
            other => Err(Error::WrongType(format!(
                "wrong type: trying to look up key '{}' in a '{}' node",
                key,
                kind_name(other)
            ))),
        }
    }

    /// Index into the array, returning an aliasing handle to the element.
    pub fn try_at_index(&self, index: usize) -> Result<Node> {
        match &*self.inner.borrow() {
            NodeKind::Array(arr) => arr
                .get(index)
                .cloned()
                .ok_or(Error::WrongIndex(index)),
            other => Err(Error::WrongType(format!(
                "wrong type: trying to index into a '{}' node",
                kind_name(other)
            ))),
        }
    }

    /// Panicking form of [`Node::try_at`].
    ///
    /// # Panics
    ///
    /// Panics if the key is missing or the node is not an object.
    pub fn at(&self, key: &str) -> Node {
        match self.try_at(key) {
            Ok(n) => n,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panicking form of [`Node::try_at_index`].
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range or the node is not an array.
    pub fn at_index(&self, index: usize) -> Node {
        match self.try_at_index(index) {
            Ok(n) => n,
            Err(e) => panic!("{e}"),
        }
    }

    /// `true` if this is an object holding `key`.
    pub fn contains(&self, key: &str) -> bool {
        matches!(&*self.inner.borrow(), NodeKind::Object(obj) if obj.contains_key(key))
    }

    /// Replace this node's content in place. Every alias of the handle
    /// observes the new content, so `config.at("port").set(9090)` rewrites
    /// the tree.
    pub fn set(&self, content: impl Into<Node>) {
        let node = content.into();
        if Rc::ptr_eq(&self.inner, &node.inner) {
            return;
        }
        let kind = node.inner.borrow().clone();
        *self.inner.borrow_mut() = kind;
    }

    /// A structurally equal copy sharing nothing with this node.
    pub fn deep_clone(&self) -> Node {
        let kind = match &*self.inner.borrow() {
            NodeKind::Value(v) => NodeKind::Value(v.clone()),
            NodeKind::Array(arr) => {
                let mut out = Array::new();
                for item in arr.iter() {
                    out.push_back(item.deep_clone());
                }
                NodeKind::Array(out)
            }
            NodeKind::Object(obj) => {
                let mut out = Object::new();
                for (key, child) in obj.iter() {
                    out.insert(key.clone(), child.deep_clone());
                }
                NodeKind::Object(out)
            }
        };
        Node::from_kind(kind)
    }

    /// Combine two nodes into a new one: objects merge key-by-key with
    /// the right-hand side winning on duplicates, arrays concatenate,
    /// numbers add, strings concatenate. Anything else is `WrongType`.
    /// Container children are aliased into the result, not copied.
    pub fn try_combine(&self, other: &Node) -> Result<Node> {
        let combined = match (&*self.inner.borrow(), &*other.inner.borrow()) {
            (NodeKind::Object(a), NodeKind::Object(b)) => {
                let mut out = Object::new();
                for (key, child) in a.iter() {
                    out.insert(key.clone(), child.clone());
                }
                for (key, child) in b.iter() {
                    out.insert(key.clone(), child.clone());
                }
                NodeKind::Object(out)
            }
            (NodeKind::Array(a), NodeKind::Array(b)) => {
                let mut out = Array::new();
                for item in a.iter().chain(b.iter()) {
                    out.push_back(item.clone());
                }
                NodeKind::Array(out)
            }
            (NodeKind::Value(a), NodeKind::Value(b)) => NodeKind::Value(combine_values(a, b)?),
            (a, b) => {
                return Err(Error::WrongType(format!(
                    "wrong type: trying to combine a '{}' node with a '{}' node",
                    kind_name(a),
                    kind_name(b)
                )))
            }
        };
        Ok(Node::from_kind(combined))
    }

    /// Canonical text form: scalars via [`Value::stringify`], containers
    /// via the luco serialization with the default indent.
    pub fn stringify(&self) -> String {
        match &*self.inner.borrow() {
            NodeKind::Value(v) => v.stringify(),
            _ => self.dump_to_string(Indent::default()),
        }
    }

    /// Serialize the tree to luco text.
    pub fn dump_to_string(&self, indent: Indent) -> String {
        encode::to_luco_string(self, indent)
    }

    /// Serialize the tree to pretty-printed JSON text.
    pub fn dump_to_json_string(&self, indent: Indent) -> String {
        encode::to_json_string(self, indent)
    }

    /// Serialize luco text to standard output.
    pub fn dump_to_stdout(&self, indent: Indent) -> Result<()> {
        self.dump_to_writer(&mut std::io::stdout(), indent)
    }

    /// Serialize luco text into `writer`.
    pub fn dump_to_writer(&self, writer: &mut dyn Write, indent: Indent) -> Result<()> {
        writer
            .write_all(self.dump_to_string(indent).as_bytes())
            .map_err(|e| Error::Filesystem(format!("couldn't write luco dump: {e}")))
    }

    /// Serialize luco text into the file at `path`, replacing its content.
    pub fn dump_to_file(&self, path: impl AsRef<Path>, indent: Indent) -> Result<()> {
        let path = path.as_ref();
        let mut file = std::fs::File::create(path).map_err(|e| {
            Error::Filesystem(format!("couldn't open '{}': {e}", path.display()))
        })?;
        file.write_all(self.dump_to_string(indent).as_bytes())
            .map_err(|e| {
                Error::Filesystem(format!("couldn't write to '{}': {e}", path.display()))
            })
    }
}

fn combine_values(a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(Value::String(format!("{x}{y}"))),
        (Value::Integer(x), Value::Integer(y)) => x
            .checked_add(*y)
            .map(Value::Integer)
            .ok_or_else(|| {
                Error::WrongType(
                    "wrong type: integer overflow while combining two integer values".to_string(),
                )
            }),
        (x, y) if x.is_number() && y.is_number() => {
            Ok(Value::Float(x.try_as_number()? + y.try_as_number()?))
        }
        (x, y) => Err(Error::WrongType(format!(
            "wrong type: trying to combine a '{}' value with a '{}' value",
            x.type_name(),
            y.type_name()
        ))),
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::new()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        *self.inner.borrow() == *other.inner.borrow()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&*self.inner.borrow(), f)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stringify())
    }
}

impl std::ops::Add for &Node {
    type Output = Node;

    /// Raising form of [`Node::try_combine`].
    ///
    /// # Panics
    ///
    /// Panics with the `WrongType` message when the nodes cannot be
    /// combined.
    fn add(self, rhs: &Node) -> Node {
        match self.try_combine(rhs) {
            Ok(n) => n,
            Err(e) => panic!("{e}"),
        }
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Node::from_kind(NodeKind::Value(v))
    }
}

impl From<Object> for Node {
    fn from(obj: Object) -> Self {
        Node::from_kind(NodeKind::Object(obj))
    }
}

impl From<Array> for Node {
    fn from(arr: Array) -> Self {
        Node::from_kind(NodeKind::Array(arr))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::from(Value::from(s))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::from(Value::from(s))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::from(Value::from(b))
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::from(Value::from(i))
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::from(Value::from(i))
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Node::from(Value::from(f))
    }
}

impl From<f32> for Node {
    fn from(f: f32) -> Self {
        Node::from(Value::from(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_node_is_empty_object() {
        let node = Node::new();
        assert_eq!(node.node_type(), NodeType::Object);
        assert_eq!(node.value_type(), ValueType::None);
        assert!(node.as_object().is_empty());
        node.insert("k", 1).unwrap();
        assert!(node.contains("k"));
    }

    #[test]
    fn test_clone_aliases_deep_clone_detaches() {
        let node = Node::from(1);
        let alias = node.clone();
        let detached = node.deep_clone();
        alias.set(2);
        assert_eq!(node.as_integer(), 2);
        assert_eq!(detached.as_integer(), 1);
    }

    #[test]
    fn test_set_through_child_handle() {
        let root = Node::with_kind(NodeType::Object);
        root.insert("port", 8080).unwrap();
        root.at("port").set(9090);
        assert_eq!(root.at("port").as_integer(), 9090);
    }

    #[test]
    fn test_insert_into_non_object_fails() {
        let node = Node::from("scalar");
        assert!(node.insert("k", 1).unwrap_err().is_wrong_type());
        assert!(node.push_back(1).unwrap_err().is_wrong_type());
    }

    #[test]
    fn test_lookup_errors() {
        let root = Node::with_kind(NodeType::Object);
        assert!(root.try_at("missing").unwrap_err().is_key_not_found());
        let arr = Node::with_kind(NodeType::Array);
        arr.push_back(1).unwrap();
        assert!(arr.try_at_index(0).is_ok());
        assert!(matches!(
            arr.try_at_index(5),
            Err(Error::WrongIndex(5))
        ));
    }

    #[test]
    fn test_combine_objects_right_wins() {
        let left = Node::from_pairs([("a", 1), ("b", 2)]);
        let right = Node::from_pairs([("b", 20), ("c", 30)]);
        let merged = &left + &right;
        assert_eq!(merged.at("a").as_integer(), 1);
        assert_eq!(merged.at("b").as_integer(), 20);
        assert_eq!(merged.at("c").as_integer(), 30);
        // Operands are untouched.
        assert_eq!(left.at("b").as_integer(), 2);
    }

    #[test]
    fn test_combine_arrays_concatenates() {
        let left = Node::from_values([1, 2]);
        let right = Node::from_values([3]);
        let joined = left.try_combine(&right).unwrap();
        assert_eq!(joined.as_array().len(), 3);
        assert_eq!(joined.at_index(2).as_integer(), 3);
    }

    #[test]
    fn test_combine_scalars() {
        let sum = Node::from(2).try_combine(&Node::from(3)).unwrap();
        assert_eq!(sum.as_integer(), 5);
        let mixed = Node::from(2).try_combine(&Node::from(0.5)).unwrap();
        assert_eq!(mixed.as_double(), 2.5);
        let cat = Node::from("foo").try_combine(&Node::from("bar")).unwrap();
        assert_eq!(cat.as_string(), "foobar");
        assert!(Node::from(true)
            .try_combine(&Node::from(1))
            .unwrap_err()
            .is_wrong_type());
    }

    #[test]
    fn test_combine_mismatched_kinds_fails() {
        let obj = Node::with_kind(NodeType::Object);
        let arr = Node::with_kind(NodeType::Array);
        assert!(obj.try_combine(&arr).unwrap_err().is_wrong_type());
    }

    #[test]
    fn test_deep_equality() {
        let a = Node::from_pairs([("x", Node::from_values([1, 2]))]);
        let b = Node::from_pairs([("x", Node::from_values([1, 2]))]);
        assert_eq!(a, b);
        b.at("x").push_back(3).unwrap();
        assert_ne!(a, b);
    }
}
