//! Cross-reference graph (NetworkTree) accumulated during Stage B.
//!
//! Nodes and links are inserted while pages render. Once the crawl is
//! done, [`NetworkTree::compile_lookup`] builds the id and slug maps and
//! [`NetworkTree::compute_crosslinks`] fills every node's adjacency.

mod node;
mod tree;

pub use node::{GraphLink, GraphNode, LinkType};
pub use tree::NetworkTree;
