// Copyright (c) 2018 Fabian Schuiki

//! Syntax graphs built during parsing.

use std::fmt;
use std::ops::Index;

/// A unique node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a node id from a usize.
    pub fn from_usize(id: usize) -> NodeId {
        NodeId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An abstract syntax tree stored as an arena of labeled nodes.
///
/// Nodes are only ever added. A node's id is its index in the arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxGraph {
    labels: Vec<String>,
    children: Vec<Vec<NodeId>>,
    root: Option<NodeId>,
}

impl SyntaxGraph {
    /// Create an empty graph.
    pub fn new() -> SyntaxGraph {
        SyntaxGraph::default()
    }

    /// Add a node without children.
    pub fn add_node<S: Into<String>>(&mut self, label: S) -> NodeId {
        let id = NodeId(self.labels.len());
        self.labels.push(label.into());
        self.children.push(Vec::new());
        id
    }

    /// Append `child` to the children of `parent`.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) {
        self.children[parent.0].push(child);
    }

    /// The label of a node.
    pub fn label(&self, id: NodeId) -> &str {
        &self.labels[id.0]
    }

    /// The children of a node, from left to right.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id.0]
    }

    /// The root node. `None` if nothing was parsed.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the root node.
    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Remove all nodes.
    pub fn clear(&mut self) {
        self.labels.clear();
        self.children.clear();
        self.root = None;
    }

    fn fmt_node(&self, f: &mut fmt::Formatter, id: NodeId, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.label(id), indent = depth * 2)?;
        for &child in self.children(id) {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Index<NodeId> for SyntaxGraph {
    type Output = str;

    fn index(&self, index: NodeId) -> &str {
        self.label(index)
    }
}

/// Prints the tree below the root, one node per line, indented by depth.
impl fmt::Display for SyntaxGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.root {
            Some(root) => self.fmt_node(f, root, 0),
            None => write!(f, "<empty>"),
        }
    }
}
