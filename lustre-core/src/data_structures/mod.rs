//! Generic containers used by the filesystem plug-in.
//!
//! # Organization
//!
//! - [`sorted`] - Red-black tree ordered by a caller-supplied comparator
//! - [`queue`] - Lock-protected double-ended list
//! - [`operations`] - Operations descriptors (comparison + reference-count hooks)
//! - [`options`] - Construction-time settings
//! - `internal` - Node storage shared by both (pub(crate))
//!
//! ```text
//!             ┌──────────────────────┐
//!  caller ───►│ TreeOperations<T>    │◄─── RbTree<T, O>      (caller locks)
//!             │ ListOperations<T>    │◄─── LockedList<T, O>  (locks itself)
//!             └──────────────────────┘
//! ```

pub(crate) mod internal;
pub mod operations;
pub mod options;
pub mod queue;
pub mod sorted;

pub use operations::{DefaultOperations, ListOperations, TreeOperations};
pub use options::CollectionCreateOptions;
pub use queue::LockedList;
pub use sorted::{Iter, RB_TREE_HEIGHT_LIMIT, RbTree, RbTreeIterator};
