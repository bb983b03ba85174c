//! Types for suffix tree indexing
//!
//! This module defines the core types shared by the builder, the searcher,
//! the walker and the report emitter.

use serde::{Deserialize, Serialize};

/// Index of a node in the arena
pub type NodeIndex = usize;

/// Position in the text buffer (0-based, stable for the tree's lifetime)
pub type TextPosition = usize;

/// Caller-supplied identifier of a logical unit (document, sentence, ...)
pub type UnitId = u32;

/// Sequential number of an inserted text within one tree
pub type TextNr = u32;

/// Index of the root node
pub const ROOT: NodeIndex = 0;

/// Handle to an [`EndMarker`] in the tree's marker table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub(crate) u32);

impl MarkerId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shared "open interval end"
///
/// Every leaf edge created while a text is being inserted refers to the same
/// marker. Advancing the marker extends all of those edges at once. Once the
/// text is complete the marker is frozen and never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndMarker {
    value: TextPosition,
    frozen: bool,
}

impl EndMarker {
    pub(crate) fn new(value: TextPosition) -> Self {
        Self {
            value,
            frozen: false,
        }
    }

    /// Current end position
    #[inline]
    pub fn value(&self) -> TextPosition {
        self.value
    }

    /// Whether the marker still tracks the text being inserted
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.frozen
    }

    pub(crate) fn advance(&mut self, to: TextPosition) {
        debug_assert!(!self.frozen, "advancing a frozen end marker");
        self.value = to;
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }
}

/// End of an edge interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    /// Aliases a shared end marker
    Open(MarkerId),
    /// Materialized end position
    Fixed(TextPosition),
}

/// Half-open range `[start, end)` of the edge leading into a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    pub start: TextPosition,
    pub end: EdgeEnd,
}

impl NodeInfo {
    /// Interval of the root node (no incoming edge)
    pub(crate) const fn root() -> Self {
        Self {
            start: 0,
            end: EdgeEnd::Fixed(0),
        }
    }

    pub(crate) const fn fixed(start: TextPosition, end: TextPosition) -> Self {
        Self {
            start,
            end: EdgeEnd::Fixed(end),
        }
    }

    pub(crate) const fn open(start: TextPosition, marker: MarkerId) -> Self {
        Self {
            start,
            end: EdgeEnd::Open(marker),
        }
    }
}

/// One occurrence of a suffix in the corpus
///
/// Serialized with the field names the report format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternInfo {
    /// Unit the suffix belongs to
    pub type_nr: UnitId,
    /// Text (insertion number) the suffix belongs to
    pub pattern_nr: TextNr,
    /// Start of the suffix, relative to the beginning of its text
    pub start_pos: usize,
}

/// Construction cursor
///
/// `edge` is the buffer position whose character selects the child edge
/// below `node`; `length` chars of that edge are matched. `phase_offset` is
/// the number of characters of the current text already absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePoint {
    pub node: NodeIndex,
    pub edge: TextPosition,
    pub length: usize,
    pub phase_offset: usize,
}

impl ActivePoint {
    pub(crate) const fn at_root(edge: TextPosition) -> Self {
        Self {
            node: ROOT,
            edge,
            length: 0,
            phase_offset: 0,
        }
    }
}

/// What a leaf records about the suffix it represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    /// One absolute buffer offset per leaf
    Simple,
    /// A list of `{unit, text, start}` records per leaf
    #[default]
    Generalized,
}

impl std::str::FromStr for TreeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(TreeMode::Simple),
            "generalized" | "general" => Ok(TreeMode::Generalized),
            other => Err(format!("unknown tree mode: {}", other)),
        }
    }
}

/// Inclusive range of characters reserved for terminators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminatorRange {
    pub first: char,
    pub last: char,
}

impl TerminatorRange {
    /// Unicode private use area (U+E000..=U+F8FF)
    pub const PRIVATE_USE: TerminatorRange = TerminatorRange {
        first: '\u{E000}',
        last: '\u{F8FF}',
    };

    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        self.first <= ch && ch <= self.last
    }
}

/// Configuration for suffix tree construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Leaf occurrence payload (default: generalized)
    #[serde(default)]
    pub mode: TreeMode,
    /// If set, every text must end in a character from this range
    #[serde(default)]
    pub reserved_terminators: Option<TerminatorRange>,
    /// Run the structural self-check after every insertion
    #[serde(default = "default_check_invariants")]
    pub check_invariants: bool,
}

fn default_check_invariants() -> bool {
    cfg!(debug_assertions)
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            mode: TreeMode::default(),
            reserved_terminators: None,
            check_invariants: default_check_invariants(),
        }
    }
}

impl TreeConfig {
    pub fn simple() -> Self {
        Self {
            mode: TreeMode::Simple,
            ..Default::default()
        }
    }

    pub fn generalized() -> Self {
        Self {
            mode: TreeMode::Generalized,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_info_field_names() {
        let info = PatternInfo {
            type_nr: 2,
            pattern_nr: 5,
            start_pos: 7,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"typeNr":2,"patternNr":5,"startPos":7}"#);
    }

    #[test]
    fn test_tree_mode_parse() {
        assert_eq!("simple".parse::<TreeMode>().unwrap(), TreeMode::Simple);
        assert_eq!("Generalized".parse::<TreeMode>().unwrap(), TreeMode::Generalized);
        assert!("compact".parse::<TreeMode>().is_err());
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: TreeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mode, TreeMode::Generalized);
        assert!(config.reserved_terminators.is_none());
    }

    #[test]
    fn test_end_marker_freeze() {
        let mut marker = EndMarker::new(3);
        marker.advance(5);
        assert_eq!(marker.value(), 5);
        assert!(marker.is_open());
        marker.freeze();
        assert!(!marker.is_open());
        assert_eq!(marker.value(), 5);
    }

    #[test]
    fn test_private_use_range() {
        assert!(TerminatorRange::PRIVATE_USE.contains('\u{E000}'));
        assert!(TerminatorRange::PRIVATE_USE.contains('\u{F8FF}'));
        assert!(!TerminatorRange::PRIVATE_USE.contains('$'));
    }
}
