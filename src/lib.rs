//! Versioned node-tree document model for rich-text lists.
//!
//! Nodes live in an arena keyed by stable identifiers and are versioned
//! copy-on-write, one transaction per edit gesture. The list family of
//! ordered, unordered, and checklist containers with their item nodes
//! carries the structural editing surface: indent, outdent, merge,
//! split, renumbering, and projection to and from HTML list markup.

pub mod dom;
pub mod json;
pub mod list;
pub mod selection;
pub mod tree;

pub use dom::{DomElement, ListTheme};
pub use selection::{Point, PointKind, RangeSelection, Selection};
pub use tree::{DocTree, Edit, ListKind, Node, NodeBody, NodeKey, NodeKind, Snapshot, TreeError};
