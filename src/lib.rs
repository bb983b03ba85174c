//! # gstindex - Generalized Suffix Tree Index
//!
//! gstindex builds a generalized suffix tree over many texts and answers
//! substring queries in time proportional to the pattern length.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`tree`] - Text buffer, node arena, online construction, queries, traversal
//! - [`report`] - Streaming JSON report of every node and its occurrences
//! - [`corpus`] - Loading texts from files and building trees from them
//! - [`output`] - Colored terminal rendering of search results
//! - [`utils`] - App data directory, configuration, progress bars
//!
//! ## Quick Start
//!
//! ```
//! use gstindex::tree::SuffixTree;
//!
//! let mut tree = SuffixTree::generalized();
//! tree.insert(0, "abc#").unwrap();
//! tree.insert(1, "abd$").unwrap();
//!
//! for info in tree.locate("ab").unwrap() {
//!     println!("unit {} text {} at {}", info.type_nr, info.pattern_nr, info.start_pos);
//! }
//!
//! let report = tree.write_report(Vec::new()).unwrap();
//! assert!(report.starts_with(b"{\"unitCount\":2"));
//! ```
//!
//! ## Texts and terminators
//!
//! Every text ends in its unit's terminator, a character that appears
//! nowhere else. Texts of one unit share the terminator, so identical
//! suffixes of the same unit end at one leaf holding several occurrences.

pub mod corpus;
pub mod error;
pub mod interrupt;
pub mod output;
pub mod report;
pub mod tree;
pub mod utils;

pub use error::{Error, Result};
pub use interrupt::Interrupt;
pub use report::{ReportDocument, ReportEmitter, TreeSummary};
pub use tree::{PatternInfo, SuffixTree, TreeConfig, TreeMode};
