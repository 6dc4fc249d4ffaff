//! Object and array containers backing the document tree.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::node::Node;

/// A key-value container with unique keys, iterated in key-sorted order.
///
/// Inserting an existing key replaces its node handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    entries: BTreeMap<String, Node>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning a handle to the stored node.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Node {
        let key = key.into();
        self.entries.insert(key.clone(), node);
        self.entries[&key].clone()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key-sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Node);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// An ordered sequence of nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array {
    items: Vec<Node>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, returning a handle to the stored node.
    pub fn push_back(&mut self, node: Node) -> Node {
        self.items.push(node);
        self.items[self.items.len() - 1].clone()
    }

    pub fn pop_back(&mut self) -> Option<Node> {
        self.items.pop()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn front(&self) -> Option<&Node> {
        self.items.first()
    }

    pub fn back(&self) -> Option<&Node> {
        self.items.last()
    }

    /// Remove the element at `index`, shifting later elements left.
    /// Out-of-range indexes are ignored.
    pub fn erase(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    /// Remove every element in `range`. The range is clamped to the
    /// array's bounds, so over-long ranges are not an error.
    pub fn erase_range(&mut self, range: Range<usize>) {
        let start = range.start.min(self.items.len());
        let end = range.end.min(self.items.len());
        if start < end {
            self.items.drain(start..end);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_sorted_iteration() {
        let mut obj = Object::new();
        obj.insert("zebra", Node::from(1));
        obj.insert("apple", Node::from(2));
        obj.insert("mango", Node::from(3));
        let keys: Vec<&String> = obj.keys().collect();
        assert_eq!(keys, ["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_object_insert_replaces() {
        let mut obj = Object::new();
        obj.insert("k", Node::from(1));
        obj.insert("k", Node::from(2));
        assert_eq!(obj.len(), 1);
        assert_eq!(obj.get("k").unwrap().as_integer(), 2);
    }

    #[test]
    fn test_array_order_and_erase_range() {
        let mut arr = Array::new();
        for i in 0..5 {
            arr.push_back(Node::from(i));
        }
        arr.erase_range(1..3);
        let left: Vec<i64> = arr.iter().map(Node::as_integer).collect();
        assert_eq!(left, [0, 3, 4]);
        arr.erase_range(2..99);
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.back().unwrap().as_integer(), 3);
        assert_eq!(arr.front().unwrap().as_integer(), 0);
    }
}
