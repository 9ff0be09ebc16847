//! Double-ended lists.
//!
//! Internally synchronized with one exclusive lock per list.

pub mod locked_list;

pub use locked_list::LockedList;
