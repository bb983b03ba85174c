//! Generalized suffix tree
//!
//! The tree indexes every suffix of every inserted text. All texts live in
//! one append-only [`TextBuffer`]; nodes live in a [`NodeArena`] and refer to
//! their edge labels by buffer interval. Construction is online (Ukkonen),
//! and later texts resume from the longest prefix the tree already contains.
//!
//! ```
//! use gstindex::tree::SuffixTree;
//!
//! let mut tree = SuffixTree::generalized();
//! tree.insert(0, "banana$").unwrap();
//! tree.insert(1, "bandana#").unwrap();
//!
//! assert!(tree.contains("ana").unwrap());
//! assert_eq!(tree.locate("band").unwrap().len(), 1);
//! ```

pub mod buffer;
pub mod builder;
pub mod factory;
pub mod node;
pub mod search;
pub mod types;
pub mod walker;

pub use buffer::{TextBuffer, TextSpan};
pub use builder::{SuffixTree, TreeState};
pub use factory::{LeafContext, NodeFactory};
pub use node::{LeafInfo, Node, NodeArena};
pub use types::*;
pub use walker::{FnVisitor, TreeWalker, Visitor};
