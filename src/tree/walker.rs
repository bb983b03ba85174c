//! Depth-first traversal over the node arena
//!
//! The walker keeps its own stack instead of recursing, so degenerate inputs
//! (long runs of one character) cannot overflow the call stack.

use super::builder::{SuffixTree, TreeState};
use super::types::*;
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;

/// Receives entry and exit events for every node in a walk
pub trait Visitor {
    /// Called before any child of `node` is visited
    fn enter(&mut self, tree: &SuffixTree, node: NodeIndex, depth: usize) -> Result<()>;

    /// Called after every child of `node` was visited
    fn exit(&mut self, _tree: &SuffixTree, _node: NodeIndex, _depth: usize) -> Result<()> {
        Ok(())
    }
}

/// Adapts a pair of closures to [`Visitor`]
pub struct FnVisitor<E, X> {
    on_enter: E,
    on_exit: X,
}

impl<E, X> FnVisitor<E, X>
where
    E: FnMut(&SuffixTree, NodeIndex, usize) -> Result<()>,
    X: FnMut(&SuffixTree, NodeIndex, usize) -> Result<()>,
{
    pub fn new(on_enter: E, on_exit: X) -> Self {
        Self { on_enter, on_exit }
    }
}

impl<E, X> Visitor for FnVisitor<E, X>
where
    E: FnMut(&SuffixTree, NodeIndex, usize) -> Result<()>,
    X: FnMut(&SuffixTree, NodeIndex, usize) -> Result<()>,
{
    fn enter(&mut self, tree: &SuffixTree, node: NodeIndex, depth: usize) -> Result<()> {
        (self.on_enter)(tree, node, depth)
    }

    fn exit(&mut self, tree: &SuffixTree, node: NodeIndex, depth: usize) -> Result<()> {
        (self.on_exit)(tree, node, depth)
    }
}

enum Step {
    Enter(NodeIndex, usize),
    Exit(NodeIndex, usize),
}

/// Pre/post-order walker restartable from any node
pub struct TreeWalker<'t> {
    tree: &'t SuffixTree,
    interrupt: Option<&'t Interrupt>,
}

impl<'t> TreeWalker<'t> {
    /// Walker that honours the tree's own interrupt, if any
    pub fn new(tree: &'t SuffixTree) -> Self {
        Self {
            tree,
            interrupt: tree.interrupt(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: &'t Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Visit the subtree rooted at `start`
    ///
    /// Children are visited in ascending order of their first edge character.
    pub fn walk<V: Visitor + ?Sized>(&self, start: NodeIndex, visitor: &mut V) -> Result<()> {
        if self.tree.state() == TreeState::Poisoned {
            return Err(Error::Poisoned);
        }
        if self.tree.node(start).is_none() {
            return Err(Error::invariant(format!("walk started at unknown node {}", start)));
        }

        let mut stack = vec![Step::Enter(start, 0)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(idx, depth) => {
                    if self.interrupt.is_some_and(|i| i.is_triggered()) {
                        return Err(Error::Interrupted);
                    }
                    let node = self.tree.node(idx).ok_or_else(|| {
                        Error::invariant(format!("dangling child index {}", idx))
                    })?;
                    visitor.enter(self.tree, idx, depth)?;
                    stack.push(Step::Exit(idx, depth));
                    for &child in node.children().values().rev() {
                        stack.push(Step::Enter(child, depth + 1));
                    }
                }
                Step::Exit(idx, depth) => visitor.exit(self.tree, idx, depth)?,
            }
        }
        Ok(())
    }

    /// Visit the subtree rooted at `start` with a pair of closures
    ///
    /// Each closure borrows its own captures, so state touched on both entry
    /// and exit (a path stack, say) belongs in a struct implementing
    /// [`Visitor`] instead.
    pub fn walk_with<E, X>(&self, start: NodeIndex, on_enter: E, on_exit: X) -> Result<()>
    where
        E: FnMut(&SuffixTree, NodeIndex, usize) -> Result<()>,
        X: FnMut(&SuffixTree, NodeIndex, usize) -> Result<()>,
    {
        self.walk(start, &mut FnVisitor::new(on_enter, on_exit))
    }
}

impl SuffixTree {
    /// Walk the subtree rooted at `start` with `visitor`
    pub fn walk<V: Visitor + ?Sized>(&self, start: NodeIndex, visitor: &mut V) -> Result<()> {
        TreeWalker::new(self).walk(start, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(text: &str) -> SuffixTree {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, text).unwrap();
        tree
    }

    #[test]
    fn test_pre_and_post_order() {
        let tree = tree("aab$");
        let mut events = Vec::new();
        let mut exits = Vec::new();
        TreeWalker::new(&tree)
            .walk_with(
                ROOT,
                |t, idx, depth| {
                    events.push((t.label(idx), depth));
                    Ok(())
                },
                |t, idx, _| {
                    exits.push(t.label(idx));
                    Ok(())
                },
            )
            .unwrap();

        let labels: Vec<&str> = events.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["", "$", "a", "ab$", "b$", "b$"]);
        assert_eq!(events[3].1, 2);
        assert_eq!(exits.last().map(String::as_str), Some(""));
        assert_eq!(exits.first().map(String::as_str), Some("$"));
    }

    /// Full path label of every leaf
    struct LeafPaths {
        path: String,
        lengths: Vec<usize>,
        leaves: Vec<String>,
    }

    impl Visitor for LeafPaths {
        fn enter(&mut self, tree: &SuffixTree, node: NodeIndex, _depth: usize) -> Result<()> {
            self.lengths.push(self.path.len());
            self.path.push_str(&tree.label(node));
            if tree.node(node).is_some_and(|n| n.is_leaf()) {
                self.leaves.push(self.path.clone());
            }
            Ok(())
        }

        fn exit(&mut self, _tree: &SuffixTree, _node: NodeIndex, _depth: usize) -> Result<()> {
            if let Some(len) = self.lengths.pop() {
                self.path.truncate(len);
            }
            Ok(())
        }
    }

    #[test]
    fn test_struct_visitor_shares_state_across_events() {
        let tree = tree("aab$");
        let mut visitor = LeafPaths {
            path: String::new(),
            lengths: Vec::new(),
            leaves: Vec::new(),
        };
        tree.walk(ROOT, &mut visitor).unwrap();

        assert_eq!(visitor.leaves, vec!["$", "aab$", "ab$", "b$"]);
        assert!(visitor.path.is_empty());
        assert!(visitor.lengths.is_empty());
    }

    #[test]
    fn test_walk_from_inner_node() {
        let tree = tree("aab$");
        let inner = tree.node(ROOT).unwrap().child('a').unwrap();
        let mut count = 0;
        TreeWalker::new(&tree)
            .walk_with(inner, |_, _, _| { count += 1; Ok(()) }, |_, _, _| Ok(()))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_walk_deep_chain_without_recursion() {
        let text: String = std::iter::repeat('a').take(20_000).chain(['$']).collect();
        let tree = tree(&text);
        let mut max_depth = 0;
        TreeWalker::new(&tree)
            .walk_with(ROOT, |_, _, d| { max_depth = max_depth.max(d); Ok(()) }, |_, _, _| Ok(()))
            .unwrap();
        assert_eq!(max_depth, 20_000);
    }

    #[test]
    fn test_walk_interrupted() {
        let tree = tree("banana$");
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let result = TreeWalker::new(&tree)
            .with_interrupt(&interrupt)
            .walk_with(ROOT, |_, _, _| Ok(()), |_, _, _| Ok(()));
        assert!(matches!(result, Err(Error::Interrupted)));
    }

    #[test]
    fn test_walk_unknown_start() {
        let tree = tree("ab$");
        let result = TreeWalker::new(&tree).walk_with(999, |_, _, _| Ok(()), |_, _, _| Ok(()));
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }
}
