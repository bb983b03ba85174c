//! Node creation and leaf occurrence bookkeeping
//!
//! The construction algorithm never decides what a leaf records. It hands
//! every new interval to the [`NodeFactory`], which tags the node as a leaf
//! exactly when its edge end aliases the marker of the text being inserted.

use super::buffer::TextSpan;
use super::node::{LeafInfo, Node};
use super::types::*;
use crate::error::{Error, Result};

/// Where the suffix currently being extended comes from
#[derive(Debug, Clone, Copy)]
pub struct LeafContext {
    /// Marker of the text being inserted
    pub marker: MarkerId,
    /// Span of the text being inserted
    pub span: TextSpan,
    /// Absolute buffer position where the suffix starts
    pub suffix_start: TextPosition,
}

impl LeafContext {
    #[inline]
    fn pattern_info(&self) -> PatternInfo {
        self.span.pattern_info(self.suffix_start)
    }
}

/// Decides which occurrence payload a new leaf carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFactory {
    Simple,
    Generalized,
}

impl NodeFactory {
    pub fn for_mode(mode: TreeMode) -> Self {
        match mode {
            TreeMode::Simple => NodeFactory::Simple,
            TreeMode::Generalized => NodeFactory::Generalized,
        }
    }

    /// Create a node for `info`
    ///
    /// If the edge end aliases the active marker the node is a leaf: it takes
    /// the next `leaf_count` value and records the suffix described by `ctx`.
    pub fn create_node(
        &self,
        info: NodeInfo,
        ctx: &LeafContext,
        leaf_count: &mut usize,
    ) -> Result<Node> {
        let mut node = Node::new(info);
        if info.end != EdgeEnd::Open(ctx.marker) {
            return Ok(node);
        }

        node.occurrences = match self {
            NodeFactory::Simple => {
                // Simple trees get one leaf per suffix in suffix order
                if *leaf_count != ctx.suffix_start {
                    return Err(Error::invariant(format!(
                        "leaf #{} created for suffix starting at {}",
                        leaf_count, ctx.suffix_start
                    )));
                }
                LeafInfo::Offset(ctx.suffix_start)
            }
            NodeFactory::Generalized => LeafInfo::Records(vec![ctx.pattern_info()]),
        };
        *leaf_count += 1;
        Ok(node)
    }

    /// Append the suffix described by `ctx` to an existing leaf
    ///
    /// Only generalized trees can hold several suffixes per leaf.
    pub fn record_occurrence(&self, node: &mut Node, ctx: &LeafContext) -> Result<()> {
        if !node.is_leaf() {
            return Err(Error::invariant(
                "occurrence recorded on a node that is no longer a leaf",
            ));
        }
        match (self, &mut node.occurrences) {
            (NodeFactory::Generalized, LeafInfo::Records(records)) => {
                records.push(ctx.pattern_info());
                Ok(())
            }
            (NodeFactory::Generalized, other) => Err(Error::invariant(format!(
                "generalized leaf without record list: {:?}",
                other
            ))),
            (NodeFactory::Simple, _) => Err(Error::invariant(
                "simple tree leaf cannot hold a second occurrence",
            )),
        }
    }
}
