//! Suffix tree builder
//!
//! Builds a generalized suffix tree online, one character per phase:
//! 1. The current text's open leaves grow implicitly through its end marker
//! 2. Pending suffixes are inserted explicitly at the active point, jumping
//!    between extensions along suffix links
//! 3. A phase stops early as soon as the next character is already present
//!
//! Additional texts resume construction from the deepest point where the
//! existing tree already spells out the text's prefix.

use super::buffer::{TextBuffer, TextSpan};
use super::factory::{LeafContext, NodeFactory};
use super::node::{Node, NodeArena};
use super::types::*;
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::Range;
use tracing::{debug, warn};

/// Lifecycle of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// Accepting insertions
    Open,
    /// No further insertions; read-only
    Finalized,
    /// An insertion failed halfway; the tree must be discarded
    Poisoned,
}

/// Cursor state carried across the phases of one text
struct Phase {
    active: ActivePoint,
    /// Suffixes of the text not yet inserted explicitly
    remaining: usize,
}

/// Generalized suffix tree over an append-only text buffer
#[derive(Debug)]
pub struct SuffixTree {
    config: TreeConfig,
    factory: NodeFactory,
    buffer: TextBuffer,
    arena: NodeArena,
    markers: Vec<EndMarker>,
    /// Leaf nodes created so far
    leaf_count: usize,
    /// Occurrence records over all leaves
    occurrence_count: usize,
    unit_terminators: FxHashMap<UnitId, char>,
    terminator_units: FxHashMap<char, UnitId>,
    /// Characters seen in text bodies (terminators excluded)
    alphabet: FxHashSet<char>,
    state: TreeState,
    interrupt: Option<Interrupt>,
}

impl SuffixTree {
    /// Create an empty tree with the given configuration
    pub fn new(config: TreeConfig) -> Self {
        Self {
            factory: NodeFactory::for_mode(config.mode),
            config,
            buffer: TextBuffer::new(),
            arena: NodeArena::new(),
            markers: Vec::new(),
            leaf_count: 0,
            occurrence_count: 0,
            unit_terminators: FxHashMap::default(),
            terminator_units: FxHashMap::default(),
            alphabet: FxHashSet::default(),
            state: TreeState::Open,
            interrupt: None,
        }
    }

    /// Empty tree whose leaves record bare offsets
    pub fn simple() -> Self {
        Self::new(TreeConfig::simple())
    }

    /// Empty tree whose leaves record `{unit, text, start}` triples
    pub fn generalized() -> Self {
        Self::new(TreeConfig::generalized())
    }

    /// Build a tree from `(unit, text)` pairs in order
    pub fn build<I, S>(config: TreeConfig, units: I) -> Result<Self>
    where
        I: IntoIterator<Item = (UnitId, S)>,
        S: AsRef<str>,
    {
        let mut tree = Self::new(config);
        for (unit, text) in units {
            tree.insert(unit, text.as_ref())?;
        }
        tree.finalize();
        Ok(tree)
    }

    /// Attach a cancellation signal checked between phases and nodes
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn set_interrupt(&mut self, interrupt: Option<Interrupt>) {
        self.interrupt = interrupt;
    }

    pub fn interrupt(&self) -> Option<&Interrupt> {
        self.interrupt.as_ref()
    }

    /// Insert a text, choosing the first-text or additional-text path
    pub fn insert(&mut self, unit: UnitId, text: &str) -> Result<TextNr> {
        if self.text_count() == 0 {
            self.insert_first_text(unit, text)
        } else {
            self.insert_additional_text(unit, text)
        }
    }

    /// Build the tree over its first text
    pub fn insert_first_text(&mut self, unit: UnitId, text: &str) -> Result<TextNr> {
        self.ensure_insertable()?;
        if self.text_count() > 0 {
            return Err(Error::InvalidOperation(
                "first text already inserted; use insert_additional_text".to_string(),
            ));
        }
        self.insert_text(unit, text)
    }

    /// Extend the tree with another text
    ///
    /// The longest prefix of `text` already spelled out by the tree is
    /// absorbed without touching the structure; construction resumes at the
    /// point of divergence.
    pub fn insert_additional_text(&mut self, unit: UnitId, text: &str) -> Result<TextNr> {
        self.ensure_insertable()?;
        self.insert_text(unit, text)
    }

    /// Close the tree for insertions
    ///
    /// Edges still aliasing end markers stay open; their effective end is
    /// bounded by the global position.
    pub fn finalize(&mut self) {
        if self.state == TreeState::Open {
            self.state = TreeState::Finalized;
            debug!(
                texts = self.text_count(),
                nodes = self.node_count(),
                "suffix tree finalized"
            );
        }
    }

    fn insert_text(&mut self, unit: UnitId, text: &str) -> Result<TextNr> {
        let chars: Vec<char> = text.chars().collect();
        let terminator = self.validate(unit, &chars)?;
        let text_nr = self.buffer.spans().len() as TextNr;
        let nodes_before = self.arena.len();

        if let Err(err) = self.construct(unit, text_nr, &chars) {
            if err.poisons_tree() {
                warn!(unit, text_nr, error = %err, "suffix tree construction aborted");
                self.state = TreeState::Poisoned;
            }
            return Err(err);
        }

        self.unit_terminators.insert(unit, terminator);
        self.terminator_units.insert(terminator, unit);
        self.alphabet.extend(chars[..chars.len() - 1].iter().copied());

        if self.config.check_invariants {
            if let Err(err) = self.check_invariants() {
                self.state = TreeState::Poisoned;
                return Err(err);
            }
        }

        debug!(
            unit,
            text_nr,
            len = chars.len(),
            new_nodes = self.arena.len() - nodes_before,
            "text inserted"
        );
        Ok(text_nr)
    }

    /// Check a text before anything is mutated; returns its terminator
    fn validate(&self, unit: UnitId, chars: &[char]) -> Result<char> {
        let Some((&terminator, body)) = chars.split_last() else {
            return Err(Error::malformed(unit, "empty text"));
        };

        if let Some(range) = self.config.reserved_terminators {
            if !range.contains(terminator) {
                return Err(Error::malformed(
                    unit,
                    format!("missing terminator: text ends in {:?}", terminator),
                ));
            }
            if let Some(ch) = body.iter().find(|c| range.contains(**c)) {
                return Err(Error::malformed(
                    unit,
                    format!("reserved terminator {:?} inside text body", ch),
                ));
            }
        }

        if body.contains(&terminator) {
            return Err(Error::malformed(
                unit,
                format!("missing terminator: {:?} also occurs inside the text", terminator),
            ));
        }

        if let Some(&owner) = self.terminator_units.get(&terminator) {
            if owner != unit {
                return Err(Error::malformed(
                    unit,
                    format!("terminator {:?} already used by unit {}", terminator, owner),
                ));
            }
        }

        if let Some(&existing) = self.unit_terminators.get(&unit) {
            if existing != terminator {
                return Err(Error::malformed(
                    unit,
                    format!("unit is terminated by {:?}, not {:?}", existing, terminator),
                ));
            }
            if self.factory == NodeFactory::Simple {
                return Err(Error::malformed(unit, "simple trees hold one text per unit"));
            }
        }

        if self.alphabet.contains(&terminator) {
            return Err(Error::malformed(
                unit,
                format!("terminator {:?} occurs in an earlier text", terminator),
            ));
        }

        if let Some(ch) = body.iter().find(|c| self.terminator_units.contains_key(*c)) {
            return Err(Error::malformed(
                unit,
                format!("text contains terminator {:?} of unit {}", ch, self.terminator_units[ch]),
            ));
        }

        Ok(terminator)
    }

    fn construct(&mut self, unit: UnitId, text_nr: TextNr, chars: &[char]) -> Result<()> {
        let probe = self.probe_longest_match(chars);
        let span = self.buffer.begin_text(unit, text_nr, chars.len());
        let marker = self.open_marker();

        // The matched prefix is implicitly present already
        self.buffer.extend_from_slice(&chars[..probe.phase_offset]);
        self.markers[marker.index()].advance(self.buffer.len());

        let mut phase = Phase {
            active: probe,
            remaining: probe.phase_offset,
        };
        let mut ctx = LeafContext {
            marker,
            span,
            suffix_start: span.start,
        };

        for &ch in &chars[probe.phase_offset..] {
            self.check_interrupt()?;
            self.buffer.push(ch);
            let pos = self.buffer.len() - 1;
            self.markers[marker.index()].advance(pos + 1);
            self.extend(pos, &mut phase, &mut ctx)?;
        }

        self.settle_pending(&mut phase, &mut ctx)?;
        self.close_marker(marker);

        if self.occurrence_count != self.buffer.len() {
            return Err(Error::invariant(format!(
                "{} occurrence records for {} inserted suffixes",
                self.occurrence_count,
                self.buffer.len()
            )));
        }
        Ok(())
    }

    /// Walk existing edges as far as they spell out `text`
    ///
    /// The returned point is expressed in buffer positions the text will
    /// occupy once appended. Leaves are never entered: a text that runs to
    /// the end of a leaf edge stops at the end of that edge.
    pub fn probe_longest_match(&self, text: &[char]) -> ActivePoint {
        let text_start = self.buffer.len();
        let mut node = ROOT;
        let mut depth = 0;

        while depth < text.len() {
            let Some(child) = self.arena[node].child(text[depth]) else {
                break;
            };
            let label = self.buffer.slice(self.edge_range(child));
            let matched = label
                .iter()
                .zip(&text[depth..])
                .take_while(|(a, b)| a == b)
                .count();

            if matched == label.len() && !self.arena[child].is_leaf() {
                node = child;
                depth += matched;
                continue;
            }

            return ActivePoint {
                node,
                edge: text_start + depth,
                length: matched,
                phase_offset: depth + matched,
            };
        }

        ActivePoint {
            phase_offset: depth,
            node,
            ..ActivePoint::at_root(text_start + depth)
        }
    }

    /// One phase: make every suffix ending at `pos` present in the tree
    fn extend(&mut self, pos: TextPosition, phase: &mut Phase, ctx: &mut LeafContext) -> Result<()> {
        let ch = self.buffer.char_at(pos);
        phase.remaining += 1;
        let mut last_new: Option<NodeIndex> = None;

        while phase.remaining > 0 {
            if phase.active.length == 0 {
                phase.active.edge = pos;
            }
            let edge_char = self.buffer.char_at(phase.active.edge);
            let node = phase.active.node;
            ctx.suffix_start = pos + 1 - phase.remaining;

            match self.arena[node].child(edge_char) {
                None => {
                    if phase.active.length > 0 {
                        return Err(Error::invariant(format!(
                            "active point {:?} lies on a missing edge",
                            phase.active
                        )));
                    }
                    let leaf = self.new_node(NodeInfo::open(pos, ctx.marker), ctx)?;
                    self.arena.set_child(node, edge_char, leaf);
                    if let Some(pending) = last_new.take() {
                        self.arena.set_suffix_link(pending, node);
                    }
                }
                Some(next) => {
                    let edge_len = self.edge_len(next);
                    if phase.active.length >= edge_len {
                        // Skip/count down to the next node
                        phase.active.node = next;
                        phase.active.edge += edge_len;
                        phase.active.length -= edge_len;
                        continue;
                    }

                    let next_start = self.arena[next].info.start;
                    if self.buffer.char_at(next_start + phase.active.length) == ch {
                        // Already present: the rest of this phase is implicit
                        if let Some(pending) = last_new.take() {
                            if node != ROOT {
                                self.arena.set_suffix_link(pending, node);
                            }
                        }
                        phase.active.length += 1;
                        break;
                    }

                    let split_at = next_start + phase.active.length;
                    let split = self.new_node(NodeInfo::fixed(next_start, split_at), ctx)?;
                    self.arena.set_suffix_link(split, ROOT);
                    self.arena.set_child(node, edge_char, split);

                    let leaf = self.new_node(NodeInfo::open(pos, ctx.marker), ctx)?;
                    self.arena.set_child(split, ch, leaf);

                    self.arena[next].info.start = split_at;
                    let next_char = self.buffer.char_at(split_at);
                    self.arena.set_child(split, next_char, next);

                    if let Some(pending) = last_new.replace(split) {
                        self.arena.set_suffix_link(pending, split);
                    }
                }
            }

            phase.remaining -= 1;
            self.advance_active_point(phase, pos)?;
        }
        Ok(())
    }

    /// Move the active point to the next shorter pending suffix
    fn advance_active_point(&self, phase: &mut Phase, pos: TextPosition) -> Result<()> {
        if phase.active.node == ROOT {
            if phase.active.length > 0 {
                phase.active.length -= 1;
                phase.active.edge = pos + 1 - phase.remaining;
            }
        } else {
            phase.active.node = self.arena[phase.active.node].suffix_link.ok_or_else(|| {
                Error::invariant(format!(
                    "internal node {} has no suffix link",
                    phase.active.node
                ))
            })?;
        }
        Ok(())
    }

    /// Record suffixes that end exactly at an existing leaf
    ///
    /// This only happens when texts of one unit share their terminator and
    /// end in an identical suffix.
    fn settle_pending(&mut self, phase: &mut Phase, ctx: &mut LeafContext) -> Result<()> {
        let last = self.buffer.len() - 1;
        let factory = self.factory;

        while phase.remaining > 0 {
            self.check_interrupt()?;
            let leaf = self.descend_to_leaf(&mut phase.active)?;
            ctx.suffix_start = last + 1 - phase.remaining;
            factory.record_occurrence(&mut self.arena[leaf], ctx)?;
            self.occurrence_count += 1;

            phase.remaining -= 1;
            if phase.remaining > 0 {
                self.advance_active_point(phase, last)?;
            }
        }
        Ok(())
    }

    fn descend_to_leaf(&self, active: &mut ActivePoint) -> Result<NodeIndex> {
        loop {
            if active.length == 0 {
                return Err(Error::invariant(format!(
                    "pending suffix ends at internal node {}",
                    active.node
                )));
            }
            let ch = self.buffer.char_at(active.edge);
            let next = self.arena[active.node].child(ch).ok_or_else(|| {
                Error::invariant(format!("pending suffix leaves the tree at node {}", active.node))
            })?;
            let len = self.edge_len(next);
            if active.length > len {
                active.node = next;
                active.edge += len;
                active.length -= len;
                continue;
            }
            if active.length == len && self.arena[next].is_leaf() {
                return Ok(next);
            }
            return Err(Error::invariant(format!(
                "pending suffix stops inside the edge of node {}",
                next
            )));
        }
    }

    fn new_node(&mut self, info: NodeInfo, ctx: &LeafContext) -> Result<NodeIndex> {
        let factory = self.factory;
        let node: Node = factory.create_node(info, ctx, &mut self.leaf_count)?;
        self.occurrence_count += node.occurrences.len();
        Ok(self.arena.alloc(node))
    }

    fn open_marker(&mut self) -> MarkerId {
        let id = MarkerId(self.markers.len() as u32);
        self.markers.push(EndMarker::new(self.buffer.len()));
        id
    }

    fn close_marker(&mut self, marker: MarkerId) {
        self.markers[marker.index()].freeze();
    }

    fn check_interrupt(&self) -> Result<()> {
        match &self.interrupt {
            Some(interrupt) if interrupt.is_triggered() => Err(Error::Interrupted),
            _ => Ok(()),
        }
    }

    fn ensure_insertable(&self) -> Result<()> {
        match self.state {
            TreeState::Open => Ok(()),
            TreeState::Finalized => Err(Error::InvalidOperation(
                "tree is finalized; start a new tree for more texts".to_string(),
            )),
            TreeState::Poisoned => Err(Error::Poisoned),
        }
    }

    pub(crate) fn ensure_queryable(&self) -> Result<()> {
        if self.state == TreeState::Poisoned {
            return Err(Error::Poisoned);
        }
        if self.text_count() == 0 {
            return Err(Error::QueryOnEmptyTree);
        }
        Ok(())
    }

    /// Effective end of a node's edge
    #[inline]
    pub fn edge_end(&self, idx: NodeIndex) -> TextPosition {
        let end = match self.arena[idx].info.end {
            EdgeEnd::Fixed(end) => end,
            EdgeEnd::Open(marker) => self.markers[marker.index()].value(),
        };
        end.min(self.buffer.len())
    }

    /// Buffer range of a node's edge label
    #[inline]
    pub fn edge_range(&self, idx: NodeIndex) -> Range<TextPosition> {
        let start = self.arena[idx].info.start;
        start..self.edge_end(idx).max(start)
    }

    #[inline]
    pub fn edge_len(&self, idx: NodeIndex) -> usize {
        self.edge_end(idx).saturating_sub(self.arena[idx].info.start)
    }

    /// Edge label text of a node (empty for the root)
    pub fn label(&self, idx: NodeIndex) -> String {
        self.buffer.render(self.edge_range(idx))
    }

    /// Verify the structural invariants of the whole arena
    pub fn check_invariants(&self) -> Result<()> {
        let len = self.arena.len();
        for (idx, node) in self.arena.iter() {
            if let EdgeEnd::Open(marker) = node.info.end {
                if marker.index() >= self.markers.len() {
                    return Err(Error::invariant(format!(
                        "node {} refers to unknown end marker {}",
                        idx,
                        marker.index()
                    )));
                }
            }
            if node.info.start > self.edge_end(idx) {
                return Err(Error::invariant(format!(
                    "node {} has interval start {} > end {}",
                    idx,
                    node.info.start,
                    self.edge_end(idx)
                )));
            }
            if let Some(link) = node.suffix_link {
                if link >= len {
                    return Err(Error::invariant(format!(
                        "node {} has dangling suffix link {}",
                        idx, link
                    )));
                }
            }
            for (&ch, &child) in &node.children {
                if child >= len || child == ROOT {
                    return Err(Error::invariant(format!(
                        "node {} has dangling child {} under {:?}",
                        idx, child, ch
                    )));
                }
                if self.buffer.get(self.arena[child].info.start) != Some(ch) {
                    return Err(Error::invariant(format!(
                        "child {} of node {} is keyed {:?} but its edge starts differently",
                        child, idx, ch
                    )));
                }
            }
            if idx == ROOT {
                continue;
            }
            if node.is_leaf() == node.occurrences.is_empty() {
                return Err(Error::invariant(format!(
                    "leaf-status mismatch at node {}: {} children, {} occurrences",
                    idx,
                    node.children.len(),
                    node.occurrences.len()
                )));
            }
            if !node.is_leaf() {
                if node.children.len() < 2 {
                    return Err(Error::invariant(format!(
                        "internal node {} has a single child",
                        idx
                    )));
                }
                if node.suffix_link.is_none() {
                    return Err(Error::invariant(format!(
                        "internal node {} has no suffix link",
                        idx
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn mode(&self) -> TreeMode {
        self.config.mode
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.arena.get(idx)
    }

    pub(crate) fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// The logical "now": number of characters appended so far
    pub fn global_position(&self) -> TextPosition {
        self.buffer.len()
    }

    /// End marker of a text, if it exists
    pub fn end_marker(&self, text_nr: TextNr) -> Option<&EndMarker> {
        self.markers.get(text_nr as usize)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrence_count
    }

    pub fn unit_count(&self) -> usize {
        self.unit_terminators.len()
    }

    pub fn text_count(&self) -> usize {
        self.buffer.spans().len()
    }

    /// Terminator registered for a unit
    pub fn terminator_of(&self, unit: UnitId) -> Option<char> {
        self.unit_terminators.get(&unit).copied()
    }

    /// Resolve a span by text number
    pub fn span(&self, text_nr: TextNr) -> Option<&TextSpan> {
        self.buffer.span(text_nr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::LeafInfo;

    fn root_labels(tree: &SuffixTree) -> Vec<String> {
        tree.node(ROOT)
            .unwrap()
            .children()
            .values()
            .map(|&idx| tree.label(idx))
            .collect()
    }

    #[test]
    fn test_banana_structure() {
        let mut tree = SuffixTree::simple();
        tree.insert_first_text(0, "banana$").unwrap();
        tree.check_invariants().unwrap();

        assert_eq!(root_labels(&tree), vec!["$", "a", "banana$", "na"]);
        assert_eq!(tree.leaf_count(), 7);
        assert_eq!(tree.occurrence_count(), 7);
        // root + 3 internal ("a", "ana", "na") + 7 leaves
        assert_eq!(tree.node_count(), 11);
    }

    #[test]
    fn test_single_char_unit_has_two_leaves() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "x$").unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(root_labels(&tree), vec!["$", "x$"]);
    }

    #[test]
    fn test_repeated_chars_make_deep_chain() {
        let mut tree = SuffixTree::simple();
        tree.insert(0, "aaa$").unwrap();
        tree.check_invariants().unwrap();
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(root_labels(&tree), vec!["$", "a"]);
    }

    #[test]
    fn test_probe_on_empty_tree() {
        let tree = SuffixTree::generalized();
        let chars: Vec<char> = "abc$".chars().collect();
        let probe = tree.probe_longest_match(&chars);
        assert_eq!(probe.node, ROOT);
        assert_eq!(probe.length, 0);
        assert_eq!(probe.phase_offset, 0);
    }

    #[test]
    fn test_probe_stops_at_divergence() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "abc#").unwrap();

        let chars: Vec<char> = "abd$".chars().collect();
        let probe = tree.probe_longest_match(&chars);
        assert_eq!(probe.node, ROOT);
        assert_eq!(probe.length, 2);
        assert_eq!(probe.phase_offset, 2);
        assert_eq!(probe.edge, tree.global_position());
    }

    #[test]
    fn test_probe_descends_through_internal_nodes() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "abc#").unwrap();
        tree.insert(1, "abd$").unwrap();

        let chars: Vec<char> = "abx%".chars().collect();
        let probe = tree.probe_longest_match(&chars);
        assert_ne!(probe.node, ROOT);
        assert_eq!(tree.label(probe.node), "ab");
        assert_eq!(probe.length, 0);
        assert_eq!(probe.phase_offset, 2);
    }

    #[test]
    fn test_generalized_shares_prefix_node() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "abc#").unwrap();
        tree.insert(1, "abd$").unwrap();
        tree.check_invariants().unwrap();

        assert_eq!(tree.occurrence_count(), 8);
        assert_eq!(root_labels(&tree), vec!["#", "$", "ab", "b", "c#", "d$"]);
    }

    #[test]
    fn test_shared_terminator_accumulates_records() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "ab$").unwrap();
        tree.insert(0, "cab$").unwrap();
        tree.check_invariants().unwrap();

        assert_eq!(tree.occurrence_count(), 7);
        // "ab$", "b$" and "$" each end at one leaf holding two records
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn test_identical_texts_in_one_unit() {
        let mut tree = SuffixTree::generalized();
        tree.insert(3, "ab$").unwrap();
        tree.insert(3, "ab$").unwrap();
        tree.check_invariants().unwrap();
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.occurrence_count(), 6);
    }

    #[test]
    fn test_malformed_inputs_leave_tree_untouched() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "abc#").unwrap();
        let nodes = tree.node_count();
        let len = tree.global_position();

        let cases = [
            (1, ""),
            (1, "ab#x#"),
            (1, "xy#"),
            (0, "xy$"),
            (1, "a#b$"),
            (1, "xya"),
        ];
        for (unit, text) in cases {
            let err = tree.insert(unit, text).unwrap_err();
            assert!(err.is_recoverable(), "{:?} should be malformed: {}", text, err);
        }

        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.global_position(), len);
        assert_eq!(tree.text_count(), 1);
        assert_eq!(tree.state(), TreeState::Open);
    }

    #[test]
    fn test_simple_mode_rejects_second_text_of_unit() {
        let mut tree = SuffixTree::simple();
        tree.insert(0, "ab$").unwrap();
        let err = tree.insert(0, "ba$").unwrap_err();
        assert!(matches!(err, Error::MalformedInput { unit: 0, .. }));
        tree.insert(1, "ba#").unwrap();
        tree.check_invariants().unwrap();
        assert_eq!(tree.leaf_count(), 6);
    }

    #[test]
    fn test_reserved_terminators() {
        let mut tree = SuffixTree::new(TreeConfig {
            reserved_terminators: Some(TerminatorRange::PRIVATE_USE),
            ..TreeConfig::default()
        });
        let err = tree.insert(0, "abc$").unwrap_err();
        assert!(err.to_string().contains("missing terminator"));
        tree.insert(0, "abc\u{E000}").unwrap();
        let err = tree.insert(1, "a\u{E000}b\u{E001}").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_first_text_only_once() {
        let mut tree = SuffixTree::generalized();
        tree.insert_first_text(0, "a#").unwrap();
        assert!(matches!(
            tree.insert_first_text(1, "b$"),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_finalize_blocks_insertion() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "a#").unwrap();
        tree.finalize();
        assert_eq!(tree.state(), TreeState::Finalized);
        assert!(matches!(tree.insert(1, "b$"), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_interrupt_poisons_tree() {
        let interrupt = Interrupt::new();
        let mut tree = SuffixTree::generalized().with_interrupt(interrupt.clone());
        tree.insert(0, "abc#").unwrap();

        interrupt.trigger();
        assert!(matches!(tree.insert(1, "xyz$"), Err(Error::Interrupted)));
        assert_eq!(tree.state(), TreeState::Poisoned);
        assert!(matches!(tree.insert(2, "q%"), Err(Error::Poisoned)));
    }

    #[test]
    fn test_end_markers_freeze_per_text() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "ab#").unwrap();
        tree.insert(1, "cd$").unwrap();

        let first = tree.end_marker(0).unwrap();
        let second = tree.end_marker(1).unwrap();
        assert!(!first.is_open());
        assert_eq!(first.value(), 3);
        assert_eq!(second.value(), 6);
        assert!(!second.is_open());
    }

    #[test]
    fn test_interrupt_checked_while_settling_absorbed_text() {
        let interrupt = Interrupt::new();
        let mut tree = SuffixTree::generalized().with_interrupt(interrupt.clone());
        tree.insert(0, "ab$").unwrap();

        // The whole second text is absorbed by the probe, so no phase runs
        interrupt.trigger();
        assert!(matches!(tree.insert(0, "ab$"), Err(Error::Interrupted)));
        assert_eq!(tree.state(), TreeState::Poisoned);
    }

    fn banana() -> SuffixTree {
        let mut tree = SuffixTree::simple();
        tree.insert(0, "banana$").unwrap();
        tree.check_invariants().unwrap();
        tree
    }

    fn assert_violation(tree: &SuffixTree, needle: &str) {
        match tree.check_invariants() {
            Err(Error::InvariantViolation(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {}", msg)
            }
            other => panic!("expected invariant violation, got {:?}", other),
        }
    }

    #[test]
    fn test_invariants_reject_inverted_interval() {
        let mut tree = banana();
        let leaf = tree.arena[ROOT].child('$').unwrap();
        tree.arena[leaf].info = NodeInfo::fixed(6, 2);
        assert_violation(&tree, "interval start 6 > end 2");
    }

    #[test]
    fn test_invariants_reject_dangling_child() {
        let mut tree = banana();
        tree.arena.set_child(ROOT, 'z', 999);
        assert_violation(&tree, "dangling child 999");
    }

    #[test]
    fn test_invariants_reject_dangling_suffix_link() {
        let mut tree = banana();
        let inner = tree.arena[ROOT].child('a').unwrap();
        assert!(!tree.arena[inner].is_leaf());
        tree.arena.set_suffix_link(inner, 999);
        assert_violation(&tree, "dangling suffix link 999");
    }

    #[test]
    fn test_invariants_reject_mismatched_child_key() {
        let mut tree = banana();
        let leaf = tree.arena[ROOT].children.remove(&'$').unwrap();
        tree.arena.set_child(ROOT, 'q', leaf);
        assert_violation(&tree, "keyed 'q'");
    }

    #[test]
    fn test_invariants_reject_leaf_without_occurrences() {
        let mut tree = banana();
        let leaf = tree.arena[ROOT].child('b').unwrap();
        tree.arena[leaf].occurrences = LeafInfo::None;
        assert_violation(&tree, "leaf-status mismatch");
    }

    #[test]
    fn test_build_from_pairs() {
        let tree = SuffixTree::build(TreeConfig::default(), [(0, "ab#"), (1, "ba$")]).unwrap();
        assert_eq!(tree.state(), TreeState::Finalized);
        assert_eq!(tree.unit_count(), 2);
        assert_eq!(tree.text_count(), 2);
        assert_eq!(tree.terminator_of(1), Some('$'));
    }
}
