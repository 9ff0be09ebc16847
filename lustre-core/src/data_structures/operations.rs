//! Operations descriptors.
//!
//! A collection never interprets its payload. Ordering and ownership
//! bookkeeping are delegated to a descriptor supplied at construction:
//!
//! ```text
//! RbTree<T, O: TreeOperations<T>>     compare, find_compare, ref_count_inc/dec
//! LockedList<T, O: ListOperations<T>> ref_count_inc/dec
//! ```
//!
//! The payload value itself is owned by the collection (typically a shared
//! handle such as `Arc<Inode>`), so the reference-count hooks are only
//! needed by callers that keep their own count next to the handle. Both
//! hooks default to no-ops.

use std::cmp::Ordering;

/// Ordering and ownership hooks for [`RbTree`](crate::data_structures::RbTree).
///
/// # Contract
///
/// - `compare` must be a total order over every payload stored in one tree.
/// - `find_compare(data, key)` must agree with `compare`: it returns how
///   `data` orders relative to the payload identified by `key`.
/// - `Ordering::Equal` always means "same entry". There is no secondary
///   tie-break.
///
pub trait TreeOperations<T> {
    /// Lookup key accepted by `find`, `contains` and `remove_key`.
    type Key: ?Sized;

    /// Orders two payloads.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Orders a stored payload against a lookup key.
    fn find_compare(&self, data: &T, key: &Self::Key) -> Ordering;

    /// Called once when the tree starts holding `data`.
    fn ref_count_inc(&self, _data: &T) {}

    /// Called once when the tree stops holding `data` (removal, clear, drop).
    fn ref_count_dec(&self, _data: &T) {}
}

/// Ownership hooks for [`LockedList`](crate::data_structures::LockedList).
///
/// The hooks run while the list lock is held. They must be cheap and must
/// not call back into the same list.
///
pub trait ListOperations<T> {
    /// Called once when the list starts holding `data`.
    fn ref_count_inc(&self, _data: &T) {}

    /// Called once when the list drops `data` (`empty` or drop). Not called
    /// on dequeue: the reference moves to the caller.
    fn ref_count_dec(&self, _data: &T) {}
}

/// Natural `Ord` ordering with no-op reference counting.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultOperations;

impl<T: Ord> TreeOperations<T> for DefaultOperations {
    type Key = T;

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }

    #[inline]
    fn find_compare(&self, data: &T, key: &T) -> Ordering {
        data.cmp(key)
    }
}

impl<T> ListOperations<T> for DefaultOperations {}
