//! Debug utilities: tree rendering and integrity checks.

use std::fmt;

use crate::node::Node;
use crate::Repository;

impl Repository {
    /// Render the tree as an indented diagram.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Print the tree structure to stdout.
    pub fn debug_print(&self) {
        println!("{}", self.render());
    }

    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let tree = self.tree.read();
        let mut issues = Vec::new();
        if !tree.root.is_root() {
            issues.push("root node is not flagged as root".to_owned());
        }
        if tree.root.end_of_key() {
            issues.push("root node is flagged as a stored key".to_owned());
        }

        let mut keys = 0;
        let mut path = String::new();
        // (node, length of the parent's path in bytes)
        let mut stack: Vec<(&Node, usize)> = vec![(&tree.root, 0)];
        while let Some((node, parent_len)) = stack.pop() {
            path.truncate(parent_len);
            if node.is_root() {
                if parent_len != 0 || !std::ptr::eq(node, &tree.root) {
                    issues.push(format!("non-root node under {path:?} flagged as root"));
                }
            } else {
                path.push(node.symbol());
            }
            if let Some(stored) = &node.key {
                keys += 1;
                if stored != &path {
                    issues.push(format!("node at {path:?} caches path {stored:?}"));
                }
            }
            if let Some(marker) = node.marker() {
                if marker.value == 0 {
                    issues.push(format!("marker at {path:?} carries no increments"));
                }
                if marker.pattern.is_empty() {
                    issues.push(format!("marker at {path:?} has an empty pattern"));
                }
            }
            for (&symbol, child) in &node.children {
                if child.symbol() != symbol {
                    issues.push(format!(
                        "child {:?} under {path:?} is filed as {symbol:?}",
                        child.symbol()
                    ));
                }
                stack.push((child, path.len()));
            }
        }

        if keys != tree.size {
            issues.push(format!("found {keys} stored keys but size is {}", tree.size));
        }
        issues
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.read();
        writeln!(f, "(root) size={}", tree.size)?;

        let selector = self.config.selector;
        let mut indent = String::new();
        fmt_marker(f, &tree.root, &indent, selector)?;

        // (node, indent length in bytes for its line, last among siblings)
        let mut stack = Vec::new();
        push_children(&mut stack, &tree.root, 0);
        while let Some((node, indent_len, last)) = stack.pop() {
            indent.truncate(indent_len);
            let (branch, pad) = if last { ("┗━", "  ") } else { ("┣━", "┃ ") };
            write!(f, "{indent}{branch} {}: {}", node.symbol(), node.value())?;
            if node.end_of_key() {
                write!(f, " ●")?;
            }
            writeln!(f)?;

            indent.push_str(pad);
            fmt_marker(f, node, &indent, selector)?;
            push_children(&mut stack, node, indent.len());
        }
        Ok(())
    }
}

/// Markers are listed first among a node's entries.
fn fmt_marker(f: &mut fmt::Formatter<'_>, node: &Node, indent: &str, selector: char) -> fmt::Result {
    if let Some(marker) = node.marker() {
        let branch = if node.children.is_empty() { "┗━" } else { "┣━" };
        writeln!(f, "{indent}{branch} {selector}: +{}", marker.value)?;
    }
    Ok(())
}

fn push_children<'a>(stack: &mut Vec<(&'a Node, usize, bool)>, node: &'a Node, indent_len: usize) {
    let count = node.children.len();
    stack.extend(
        node.children.values()
            .enumerate()
            .rev()
            .map(|(idx, child)| (child, indent_len, idx + 1 == count)),
    );
}
