//! Streaming node report
//!
//! Writes one JSON document of the shape
//! `{"unitCount":…,"nodeCount":…,"nodes":[{"number","label","patternInfos","frequency"}…]}`
//! while walking the tree. Nodes are numbered in pre-order and written as
//! soon as their subtree is complete, so the whole report is never held in
//! memory.
//!
//! Subtree aggregation works on one shared occurrence stack: entering a node
//! remembers the stack height and pushes the node's own records; on exit the
//! node's `patternInfos` is everything above that height. Nothing is copied
//! upward, the parent's range simply includes the child's.

use crate::error::Result;
use crate::tree::builder::SuffixTree;
use crate::tree::types::*;
use crate::tree::walker::{TreeWalker, Visitor};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

/// Record written for one node
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord<'a> {
    number: usize,
    label: &'a str,
    pattern_infos: &'a [PatternInfo],
    frequency: usize,
}

/// Owned form of a node record, for reading reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReport {
    pub number: usize,
    pub label: String,
    pub pattern_infos: Vec<PatternInfo>,
    pub frequency: usize,
}

/// Owned form of a whole report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub unit_count: usize,
    pub node_count: usize,
    pub nodes: Vec<NodeReport>,
}

/// Counts describing a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    pub mode: TreeMode,
    pub units: usize,
    pub texts: usize,
    pub chars: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitterState {
    Fresh,
    Streaming,
    Closed,
}

struct Frame {
    number: usize,
    mark: usize,
}

/// Visitor that streams the node report to a sink
pub struct ReportEmitter<W: Write> {
    sink: W,
    state: EmitterState,
    unit_count: usize,
    node_count: usize,
    next_number: usize,
    emitted: usize,
    frames: Vec<Frame>,
    occurrences: Vec<PatternInfo>,
    label: String,
}

impl<W: Write> ReportEmitter<W> {
    /// Emitter whose header carries the given counts
    pub fn new(sink: W, unit_count: usize, node_count: usize) -> Self {
        Self {
            sink,
            state: EmitterState::Fresh,
            unit_count,
            node_count,
            next_number: 0,
            emitted: 0,
            frames: Vec::new(),
            occurrences: Vec::new(),
            label: String::new(),
        }
    }

    /// Emitter whose header describes `tree`
    pub fn for_tree(tree: &SuffixTree, sink: W) -> Self {
        Self::new(sink, tree.unit_count(), tree.node_count())
    }

    /// Number of node records written so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn begin(&mut self) -> Result<()> {
        if self.state == EmitterState::Fresh {
            write!(
                self.sink,
                "{{\"unitCount\":{},\"nodeCount\":{},\"nodes\":[",
                self.unit_count, self.node_count
            )?;
            self.state = EmitterState::Streaming;
        }
        Ok(())
    }

    /// Close the node list and the document, then flush the sink
    ///
    /// Calling this again is a no-op.
    pub fn finish(&mut self) -> Result<()> {
        if self.state == EmitterState::Closed {
            return Ok(());
        }
        self.begin()?;
        self.sink.write_all(b"]}")?;
        self.sink.flush()?;
        self.state = EmitterState::Closed;
        Ok(())
    }

    /// Give the sink back
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> Visitor for ReportEmitter<W> {
    fn enter(&mut self, tree: &SuffixTree, node: NodeIndex, _depth: usize) -> Result<()> {
        self.begin()?;
        self.frames.push(Frame {
            number: self.next_number,
            mark: self.occurrences.len(),
        });
        self.next_number += 1;
        if let Some(n) = tree.node(node) {
            tree.resolve_occurrences(n.occurrences(), &mut self.occurrences)?;
        }
        Ok(())
    }

    fn exit(&mut self, tree: &SuffixTree, node: NodeIndex, _depth: usize) -> Result<()> {
        let Some(frame) = self.frames.pop() else {
            return Err(crate::Error::invariant("report exit without matching entry"));
        };

        self.label.clear();
        self.label.extend(tree.buffer().slice(tree.edge_range(node)));
        let infos = &self.occurrences[frame.mark..];
        let record = NodeRecord {
            number: frame.number,
            label: &self.label,
            pattern_infos: infos,
            frequency: infos.len(),
        };

        if self.emitted > 0 {
            self.sink.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.sink, &record)?;
        self.emitted += 1;

        if self.frames.is_empty() {
            self.occurrences.clear();
        }
        Ok(())
    }
}

impl SuffixTree {
    /// Stream the full node report to `sink` and return the sink
    pub fn write_report<W: Write>(&self, sink: W) -> Result<W> {
        let mut emitter = ReportEmitter::for_tree(self, sink);
        TreeWalker::new(self).walk(ROOT, &mut emitter)?;
        emitter.finish()?;
        info!(
            nodes = emitter.emitted(),
            units = self.unit_count(),
            "report written"
        );
        Ok(emitter.into_inner())
    }

    /// Counts describing this tree
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            mode: self.mode(),
            units: self.unit_count(),
            texts: self.text_count(),
            chars: self.global_position(),
            nodes: self.node_count(),
            leaves: self.leaf_count(),
            occurrences: self.occurrence_count(),
        }
    }
}
