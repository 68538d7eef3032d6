//! Trie vertices.
//!
//! Every node owns its literal children. The pending delta recorded by a
//! selector increment lives beside them in [`Node::marker`], so a marker can
//! never be mistaken for a literal child during traversal.

use std::collections::BTreeMap;

/// Additive delta attached to a prefix by a selector increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Number of increments applied through this prefix.
    pub value: i64,
    /// The selector pattern of the latest increment, as the caller wrote it.
    pub pattern: String,
}

/// A node in the trie. One exists for every prefix any walk has passed through.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Node {
    pub(crate) children: BTreeMap<char, Node>,
    pub(crate) symbol: char,
    pub(crate) value: i64,
    /// Full path, set once this exact path is inserted as a raw key.
    pub(crate) key: Option<String>,
    pub(crate) marker: Option<Marker>,
    pub(crate) root: bool,
}

impl Node {
    /// Create a detached node for `symbol`.
    pub fn new(symbol: char) -> Self {
        Self {
            children: BTreeMap::new(),
            symbol,
            value: 0,
            key: None,
            marker: None,
            root: false,
        }
    }

    /// Create a tree root.
    pub fn new_root() -> Self {
        let mut root = Self::new('\0');
        root.root = true;
        root
    }

    /// The character this node represents. Meaningless on the root.
    pub fn symbol(&self) -> char {
        self.symbol
    }

    /// Stored value. Only meaningful when [`end_of_key`](Self::end_of_key) is true.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// True if this exact path was inserted as a raw key.
    pub fn end_of_key(&self) -> bool {
        self.key.is_some()
    }

    /// True for the tree root only.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// The selector marker attached here, if any.
    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// Literal child for `symbol`.
    pub fn child(&self, symbol: char) -> Option<&Node> {
        self.children.get(&symbol)
    }

    pub(crate) fn child_mut(&mut self, symbol: char) -> Option<&mut Node> {
        self.children.get_mut(&symbol)
    }

    /// Get the child for `symbol`, creating it first if absent.
    pub(crate) fn force_child(&mut self, symbol: char) -> &mut Node {
        self.children
            .entry(symbol)
            .or_insert_with(|| Node::new(symbol))
    }

    /// Number of children, counting a marker as one.
    pub fn num_children(&self) -> usize {
        self.children.len() + usize::from(self.marker.is_some())
    }

    /// True if anything hangs below this node, a marker included.
    pub fn has_children(&self) -> bool {
        self.num_children() > 0
    }

    /// Delta recorded directly on this node, zero without a marker.
    pub fn marker_value(&self) -> i64 {
        self.marker.as_ref().map_or(0, |m| m.value)
    }

    /// Add one to this node's marker and record `pattern` as its name.
    pub(crate) fn bump_marker(&mut self, pattern: &str) -> i64 {
        let marker = self.marker.get_or_insert_with(|| Marker {
            value: 0,
            pattern: String::new(),
        });
        marker.value = marker.value.wrapping_add(1);
        pattern.clone_into(&mut marker.pattern);
        marker.value
    }

    /// Literal children in symbol order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }
}

// Children are drained onto a heap stack so that dropping a long chain
// cannot overflow the call stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack: Vec<Node> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}
