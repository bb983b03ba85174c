//! Pattern containment and location queries
//!
//! A query walks down from the root one edge at a time, comparing the edge
//! label against the pattern. It never backtracks, so the cost is
//! O(|pattern|) regardless of corpus size, plus the number of occurrences
//! collected for [`SuffixTree::locate`].

use super::builder::SuffixTree;
use super::node::LeafInfo;
use super::types::*;
use super::walker::{TreeWalker, Visitor};
use crate::error::{Error, Result};

impl SuffixTree {
    /// Check whether `pattern` occurs in any inserted text
    pub fn contains(&self, pattern: &str) -> Result<bool> {
        self.ensure_queryable()?;
        let pattern: Vec<char> = pattern.chars().collect();
        Ok(self.find_node(&pattern).is_some())
    }

    /// All occurrences of `pattern`, in depth-first leaf order
    pub fn locate(&self, pattern: &str) -> Result<Vec<PatternInfo>> {
        self.ensure_queryable()?;
        let pattern: Vec<char> = pattern.chars().collect();
        let Some(node) = self.find_node(&pattern) else {
            return Ok(Vec::new());
        };

        let mut collector = OccurrenceCollector::default();
        TreeWalker::new(self).walk(node, &mut collector)?;
        Ok(collector.occurrences)
    }

    /// Number of occurrences of `pattern`
    pub fn count(&self, pattern: &str) -> Result<usize> {
        self.ensure_queryable()?;
        let pattern: Vec<char> = pattern.chars().collect();
        let Some(node) = self.find_node(&pattern) else {
            return Ok(0);
        };

        let mut total = 0;
        TreeWalker::new(self).walk_with(
            node,
            |tree, idx, _| {
                if let Some(n) = tree.node(idx) {
                    total += n.occurrences().len();
                }
                Ok(())
            },
            |_, _, _| Ok(()),
        )?;
        Ok(total)
    }

    /// Node below which every occurrence of `pattern` lives
    ///
    /// If the pattern ends partway along an edge, this is the node that edge
    /// leads into. The empty pattern maps to the root.
    pub fn find_node(&self, pattern: &[char]) -> Option<NodeIndex> {
        let arena = self.arena();
        let mut node = ROOT;
        let mut matched = 0;

        while matched < pattern.len() {
            let child = arena[node].child(pattern[matched])?;
            let label = self.buffer().slice(self.edge_range(child));
            let take = label.len().min(pattern.len() - matched);
            if label[..take] != pattern[matched..matched + take] {
                return None;
            }
            matched += take;
            node = child;
        }
        Some(node)
    }

    /// Append the occurrences a leaf records, resolved to `PatternInfo`
    pub(crate) fn resolve_occurrences(
        &self,
        leaf: &LeafInfo,
        out: &mut Vec<PatternInfo>,
    ) -> Result<()> {
        match leaf {
            LeafInfo::None => {}
            LeafInfo::Offset(pos) => {
                let span = self.buffer().span_of(*pos).ok_or_else(|| {
                    Error::invariant(format!("leaf offset {} outside every text", pos))
                })?;
                out.push(span.pattern_info(*pos));
            }
            LeafInfo::Records(records) => out.extend_from_slice(records),
        }
        Ok(())
    }
}

#[derive(Default)]
struct OccurrenceCollector {
    occurrences: Vec<PatternInfo>,
}

impl Visitor for OccurrenceCollector {
    fn enter(&mut self, tree: &SuffixTree, node: NodeIndex, _depth: usize) -> Result<()> {
        if let Some(n) = tree.node(node) {
            tree.resolve_occurrences(n.occurrences(), &mut self.occurrences)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(mut infos: Vec<PatternInfo>) -> Vec<usize> {
        infos.sort();
        infos.into_iter().map(|i| i.start_pos).collect()
    }

    #[test]
    fn test_contains_mid_edge_and_at_node() {
        let mut tree = SuffixTree::simple();
        tree.insert(0, "banana$").unwrap();

        assert!(tree.contains("ana").unwrap());
        assert!(tree.contains("an").unwrap());
        assert!(tree.contains("banana$").unwrap());
        assert!(tree.contains("").unwrap());
        assert!(!tree.contains("xyz").unwrap());
        assert!(!tree.contains("nab").unwrap());
        assert!(!tree.contains("banana$x").unwrap());
    }

    #[test]
    fn test_locate_simple_offsets() {
        let mut tree = SuffixTree::simple();
        tree.insert(0, "banana$").unwrap();

        assert_eq!(starts(tree.locate("ana").unwrap()), vec![1, 3]);
        assert_eq!(starts(tree.locate("a").unwrap()), vec![1, 3, 5]);
        assert_eq!(tree.locate("b").unwrap().len(), 1);
        assert!(tree.locate("nab").unwrap().is_empty());
        assert_eq!(tree.locate("").unwrap().len(), 7);
        assert_eq!(tree.count("na").unwrap(), 2);
    }

    #[test]
    fn test_locate_resolves_units() {
        let mut tree = SuffixTree::generalized();
        tree.insert(10, "xab#").unwrap();
        tree.insert(20, "ab$").unwrap();

        let mut found = tree.locate("ab").unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![
                PatternInfo { type_nr: 10, pattern_nr: 0, start_pos: 1 },
                PatternInfo { type_nr: 20, pattern_nr: 1, start_pos: 0 },
            ]
        );
    }

    #[test]
    fn test_locate_is_order_stable() {
        let mut tree = SuffixTree::generalized();
        tree.insert(0, "mississippi$").unwrap();
        let first = tree.locate("ssi").unwrap();
        let second = tree.locate("ssi").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_query_on_empty_tree() {
        let tree = SuffixTree::generalized();
        assert!(matches!(tree.contains("a"), Err(Error::QueryOnEmptyTree)));
        assert!(matches!(tree.locate("a"), Err(Error::QueryOnEmptyTree)));
    }

    #[test]
    fn test_query_on_poisoned_tree() {
        let interrupt = crate::interrupt::Interrupt::new();
        let mut tree = SuffixTree::generalized().with_interrupt(interrupt.clone());
        tree.insert(0, "ab#").unwrap();
        interrupt.trigger();
        assert!(tree.insert(1, "cd$").is_err());
        assert!(matches!(tree.contains("a"), Err(Error::Poisoned)));
    }
}
