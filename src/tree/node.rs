//! Node records and the arena that owns them
//!
//! Nodes refer to each other only by [`NodeIndex`]; there are no pointers
//! and no reference cycles, so suffix links can point sideways or backwards
//! freely.

use super::types::*;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// Occurrence payload of a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LeafInfo {
    /// Internal node (or a node that never became a leaf)
    #[default]
    None,
    /// Simple mode: absolute buffer offset of the suffix
    Offset(TextPosition),
    /// Generalized mode: one record per text whose suffix ends here
    Records(Vec<PatternInfo>),
}

impl LeafInfo {
    /// Number of occurrences recorded
    pub fn len(&self) -> usize {
        match self {
            LeafInfo::None => 0,
            LeafInfo::Offset(_) => 1,
            LeafInfo::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node of the suffix tree
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) info: NodeInfo,
    pub(crate) suffix_link: Option<NodeIndex>,
    /// Children keyed by the first character of their edge, ascending by code point
    pub(crate) children: BTreeMap<char, NodeIndex>,
    pub(crate) occurrences: LeafInfo,
}

impl Node {
    pub(crate) fn new(info: NodeInfo) -> Self {
        Self {
            info,
            suffix_link: None,
            children: BTreeMap::new(),
            occurrences: LeafInfo::None,
        }
    }

    /// Edge interval leading into this node
    #[inline]
    pub fn info(&self) -> NodeInfo {
        self.info
    }

    #[inline]
    pub fn suffix_link(&self) -> Option<NodeIndex> {
        self.suffix_link
    }

    #[inline]
    pub fn children(&self) -> &BTreeMap<char, NodeIndex> {
        &self.children
    }

    #[inline]
    pub fn child(&self, ch: char) -> Option<NodeIndex> {
        self.children.get(&ch).copied()
    }

    #[inline]
    pub fn occurrences(&self) -> &LeafInfo {
        &self.occurrences
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Growable vector of nodes; index 0 is always the root
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create an arena holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeInfo::root())],
        }
    }

    /// Append a node and return its index
    pub(crate) fn alloc(&mut self, node: Node) -> NodeIndex {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub(crate) fn set_child(&mut self, parent: NodeIndex, ch: char, child: NodeIndex) {
        self.nodes[parent].children.insert(ch, child);
    }

    pub(crate) fn set_suffix_link(&mut self, from: NodeIndex, to: NodeIndex) {
        self.nodes[from].suffix_link = Some(to);
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeIndex> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx]
    }
}

impl IndexMut<NodeIndex> for NodeArena {
    #[inline]
    fn index_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.nodes[idx]
    }
}
