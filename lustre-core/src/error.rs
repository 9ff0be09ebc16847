//! Error vocabulary shared by the collections.

use std::collections::TryReserveError;

use thiserror::Error;

/// Recoverable failures reported by [`RbTree`](crate::data_structures::RbTree)
/// and [`LockedList`](crate::data_structures::LockedList).
///
/// Both variants leave the collection exactly as it was before the call.
/// Contract violations (a broken red-black invariant, a dangling node index,
/// an iterator path deeper than the documented height limit) are not
/// represented here: they panic.
///
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// No node could be allocated, either because the allocator refused to
    /// grow node storage or because the configured node budget is spent.
    #[error("node storage exhausted ({nodes} nodes in use)")]
    ResourceExhausted { nodes: usize },

    /// No payload compared equal to the requested key.
    #[error("no matching entry")]
    NotFound,
}

impl CollectionError {
    pub(crate) fn exhausted(nodes: usize) -> Self {
        CollectionError::ResourceExhausted { nodes }
    }

    pub(crate) fn from_reserve(_err: TryReserveError, nodes: usize) -> Self {
        CollectionError::ResourceExhausted { nodes }
    }
}
