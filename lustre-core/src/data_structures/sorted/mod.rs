//! Ordered containers.
//!
//! Not internally synchronized: callers serialize access with their own
//! lock, which the `&mut self` receivers make impossible to forget.

pub mod rb_tree;
pub mod rb_tree_iterator;

pub use rb_tree::RbTree;
pub use rb_tree_iterator::{Iter, RB_TREE_HEIGHT_LIMIT, RbTreeIterator};
