//! Header/block tree of a note body, used to cut out sections and blocks
//! for partial inclusion (`![[note#section]]`, `![[note#^block]]`).

mod block;
mod tree;

pub use block::{BLOCK_ID, find_block};
pub use tree::{Outline, SlugSet};
