//! In-memory collections used by the client metadata layer.
//!
//! - [`RbTree`]: ordered set with pluggable comparators and reference-count
//!   hooks, synchronized by its owner.
//! - [`LockedList`]: head/tail queue guarded by its own lock.
//!
//! Both collections store payloads in index-addressed node storage and
//! report allocation failure as [`CollectionError::ResourceExhausted`].

pub mod common_tests;
pub mod data_structures;
pub mod error;

pub use data_structures::{
    CollectionCreateOptions, DefaultOperations, ListOperations, LockedList, RbTree,
    RbTreeIterator, TreeOperations,
};
pub use error::CollectionError;
