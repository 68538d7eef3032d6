//! The shared, lock-guarded trie and its operations.
//!
//! Every public operation builds a [`Key`] first, then takes the lock and
//! performs one of two walks:
//!
//! - the *force* walk creates missing nodes on the way down (insert only);
//! - the *lazy* walk only follows existing nodes and reports whether the
//!   whole path could be traversed.
//!
//! A selector key is walked without its trailing marker, so both walks land on
//! the node for the literal prefix.
//!
//! Selector increments are lazy: instead of touching every key beneath a
//! prefix, they bump the [`Marker`](crate::node::Marker) on the prefix node.
//! [`Repository::get_value`] folds those markers back in on the way down.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::key::{Converter, ConverterPipeline, Key, Validator, ValidatorPipeline, SELECTOR};
use crate::node::Node;

/// Configuration for a [`Repository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Trailing character that turns a pattern into a selector.
    pub selector: char,
}

impl Default for Config {
    fn default() -> Self {
        Self { selector: SELECTOR }
    }
}

pub(crate) struct Tree {
    pub(crate) root: Node,
    pub(crate) size: usize,
}

/// Outcome of a lazy walk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Walk<'a> {
    /// Deepest node reached.
    pub(crate) node: &'a Node,
    /// Whether that node is a stored raw key.
    pub(crate) end_of_key: bool,
    /// Whether every character of the literal path was found.
    pub(crate) complete: bool,
}

impl Tree {
    fn new() -> Self {
        Self {
            root: Node::new_root(),
            size: 0,
        }
    }

    /// Walk the literal path, creating nodes as needed.
    ///
    /// Returns the last node and whether it was already a stored key.
    pub(crate) fn force_walk(&mut self, key: &Key) -> (&mut Node, bool) {
        let mut node = &mut self.root;
        for symbol in key.literal().chars() {
            node = node.force_child(symbol);
        }
        let existed = node.end_of_key();
        (node, existed)
    }

    /// Walk the literal path without creating anything.
    pub(crate) fn lazy_walk(&self, key: &Key) -> Walk<'_> {
        let mut node = &self.root;
        for symbol in key.literal().chars() {
            match node.child(symbol) {
                Some(child) => node = child,
                None => {
                    return Walk {
                        node,
                        end_of_key: false,
                        complete: false,
                    }
                }
            }
        }
        Walk {
            node,
            end_of_key: node.end_of_key(),
            complete: true,
        }
    }

    /// Mutable lazy walk. `None` if the path is incomplete.
    pub(crate) fn lazy_walk_mut(&mut self, key: &Key) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for symbol in key.literal().chars() {
            node = node.child_mut(symbol)?;
        }
        Some(node)
    }
}

/// Thread-safe string-keyed counter store with lazy prefix increments.
///
/// ```rust
/// use delta_trie::Repository;
///
/// let repo = Repository::new();
/// repo.insert("home/", 1).unwrap();
/// repo.insert("home/bin", 1).unwrap();
/// repo.inc("home/*").unwrap();
///
/// assert_eq!(repo.get_value("home/*").unwrap(), 4);
/// assert_eq!(repo.get_value("home/bin").unwrap(), 1);
/// assert_eq!(repo.size(), 2);
/// ```
pub struct Repository {
    pub(crate) tree: RwLock<Tree>,
    pub(crate) config: Config,
    validator: Box<dyn Validator>,
    converter: Box<dyn Converter>,
}

impl Repository {
    /// Create an empty repository with default configuration and no-op pipelines.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty repository with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            tree: RwLock::new(Tree::new()),
            config,
            validator: Box::new(ValidatorPipeline::new()),
            converter: Box::new(ConverterPipeline::new()),
        }
    }

    /// Replace the converter applied to every pattern after validation.
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Replace the validator applied to every raw pattern.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn key(&self, pattern: &str) -> Result<Key> {
        Key::new(
            pattern,
            self.config.selector,
            self.validator.as_ref(),
            self.converter.as_ref(),
        )
    }

    /// Insert a raw key with `value`.
    ///
    /// Fails with [`Error::SelectorNotAllowed`] for selectors and with
    /// [`Error::KeyAlreadyExists`] if the key is present, leaving it unchanged.
    pub fn insert(&self, pattern: &str, value: i64) -> Result<()> {
        let key = self.key(pattern)?;
        if key.is_selector() {
            debug!(%key, "rejected selector insert");
            return Err(Error::SelectorNotAllowed { key: key.to_string() });
        }

        let mut tree = self.tree.write();
        let (node, existed) = tree.force_walk(&key);
        if existed {
            debug!(%key, "rejected duplicate insert");
            return Err(Error::KeyAlreadyExists { key: key.to_string() });
        }
        node.key = Some(key.to_string());
        node.value = value;
        tree.size += 1;
        debug!(%key, value, size = tree.size, "inserted key");
        Ok(())
    }

    /// Insert a raw key with value zero.
    pub fn make(&self, pattern: &str) -> Result<()> {
        self.insert(pattern, 0)
    }

    /// Increment a raw key, or every key under a selector's prefix.
    ///
    /// A raw key must already be stored. A selector records one more unit of
    /// delta on its prefix node without touching the keys below it; it fails
    /// with [`Error::KeyNotFound`] if the prefix path is unknown, and also if
    /// the bare prefix was never inserted, in which case the delta has still
    /// been recorded.
    pub fn inc(&self, pattern: &str) -> Result<()> {
        let key = self.key(pattern)?;
        let not_found = || Error::KeyNotFound { key: key.to_string() };

        let mut tree = self.tree.write();
        let Some(node) = tree.lazy_walk_mut(&key) else {
            debug!(%key, "inc on unknown path");
            return Err(not_found());
        };

        if key.is_selector() {
            let delta = node.bump_marker(pattern);
            debug!(%key, delta, "bumped selector marker");
            if !node.end_of_key() {
                return Err(not_found());
            }
            return Ok(());
        }

        if !node.end_of_key() {
            debug!(%key, "inc on missing key");
            return Err(not_found());
        }
        node.value = node.value.wrapping_add(1);
        debug!(%key, value = node.value, "incremented key");
        Ok(())
    }

    /// Sum of every value matched by `pattern`, with pending deltas applied.
    ///
    /// A raw key sees only the delta recorded on its own node. A selector sums
    /// each stored key under its prefix plus every delta recorded between the
    /// prefix and that key. Unknown paths yield zero.
    pub fn get_value(&self, pattern: &str) -> Result<i64> {
        let key = self.key(pattern)?;
        let tree = self.tree.read();
        let walk = tree.lazy_walk(&key);
        trace!(%key, complete = walk.complete, "get_value walk");
        if !walk.complete {
            return Ok(0);
        }
        if key.is_selector() {
            return Ok(sum_with_deltas(walk.node));
        }
        Ok(walk.node.value().wrapping_add(walk.node.marker_value()))
    }

    /// Stored entries matched by `pattern`, keyed by full path.
    ///
    /// Values are returned as stored; deltas are not folded in. Under a
    /// selector, markers appear as entries of their own, keyed by the selector
    /// pattern exactly as it was passed to [`inc`](Self::inc).
    pub fn get_map(&self, pattern: &str) -> Result<BTreeMap<String, i64>> {
        let key = self.key(pattern)?;
        let mut out = BTreeMap::new();
        let tree = self.tree.read();
        let walk = tree.lazy_walk(&key);
        trace!(%key, complete = walk.complete, "get_map walk");
        if !walk.complete {
            return Ok(out);
        }
        if let Some(path) = &walk.node.key {
            out.insert(path.clone(), walk.node.value());
        }
        if key.is_selector() {
            collect_entries(walk.node, &mut out);
        }
        Ok(out)
    }

    /// Check if `pattern` matches anything.
    ///
    /// A raw key matches if it is stored. A selector matches if its prefix is
    /// stored or has anything beneath it.
    pub fn contains(&self, pattern: &str) -> Result<bool> {
        let key = self.key(pattern)?;
        let tree = self.tree.read();
        let walk = tree.lazy_walk(&key);
        if !walk.complete {
            return Ok(false);
        }
        Ok(walk.end_of_key || (key.is_selector() && walk.node.has_children()))
    }

    /// Number of raw keys inserted. Increments never change it.
    pub fn size(&self) -> usize {
        self.tree.read().size
    }

    /// Check if no raw key has been inserted.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first fold carrying the deltas recorded between `start` and each key.
fn sum_with_deltas(start: &Node) -> i64 {
    let mut total = 0i64;
    let mut stack = vec![(start, 0i64)];
    while let Some((node, carry)) = stack.pop() {
        let carry = carry.wrapping_add(node.marker_value());
        if node.end_of_key() {
            total = total.wrapping_add(node.value().wrapping_add(carry));
        }
        stack.extend(node.children().map(|child| (child, carry)));
    }
    total
}

fn collect_entries(start: &Node, out: &mut BTreeMap<String, i64>) {
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if let Some(path) = &node.key {
            out.insert(path.clone(), node.value());
        }
        if let Some(marker) = node.marker() {
            out.insert(marker.pattern.clone(), marker.value);
        }
        stack.extend(node.children());
    }
}
