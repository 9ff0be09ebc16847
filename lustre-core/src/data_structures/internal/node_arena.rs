use std::mem;
use std::ops::{Index, IndexMut};

use tracing::error;

use crate::data_structures::CollectionCreateOptions;
use crate::error::CollectionError;

/// Largest number of slots addressable by a [`NodeId`].
///
pub(crate) const MAX_NODE_SLOTS: usize = u32::MAX as usize;

/// Stable address of a node inside a [`NodeArena`].
///
/// Ids stay valid until the node is removed; a removed id may be handed out
/// again by a later insert.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

enum Slot<N> {
    Occupied(N),
    Vacant { next_free: Option<NodeId> },
}

/// Index-addressed node storage shared by the tree and the list.
///
/// ```text
///  slots:  [ N0 ][ free ][ N2 ][ free ][ N4 ]
///                  │   ▲          │
///  free_head ──────┼───┼──► 3 ────┘   (chain of vacant slots)
///                  └───┘
/// ```
///
/// Growth goes through `Vec::try_reserve`, so running out of memory is
/// reported as [`CollectionError::ResourceExhausted`] instead of aborting.
/// Reserving first and inserting afterwards lets a caller make every
/// fallible step before touching the structure it is about to modify.
///
pub(crate) struct NodeArena<N> {
    slots: Vec<Slot<N>>,
    free_head: Option<NodeId>,
    len: usize,
    max_nodes: Option<usize>,
}

impl<N> NodeArena<N> {
    pub(crate) const fn new() -> Self {
        NodeArena {
            slots: Vec::new(),
            free_head: None,
            len: 0,
            max_nodes: None,
        }
    }

    pub(crate) fn try_with_options(
        options: &CollectionCreateOptions,
    ) -> Result<Self, CollectionError> {
        let mut arena = Self::new();
        arena.max_nodes = options.max_nodes();

        let capacity = match options.max_nodes() {
            Some(max_nodes) => options.initial_capacity().min(max_nodes),
            None => options.initial_capacity(),
        };

        if capacity > 0 {
            arena.slots.try_reserve_exact(capacity).map_err(|err| {
                error!(capacity, "Failed to reserve initial node storage");
                CollectionError::from_reserve(err, 0)
            })?;
        }

        Ok(arena)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Makes sure the next [`insert_reserved`](Self::insert_reserved) cannot fail.
    ///
    pub(crate) fn try_reserve_one(&mut self) -> Result<(), CollectionError> {
        if let Some(max_nodes) = self.max_nodes
            && self.len >= max_nodes
        {
            return Err(CollectionError::exhausted(self.len));
        }

        if self.free_head.is_some() {
            return Ok(());
        }

        if self.slots.len() >= MAX_NODE_SLOTS {
            return Err(CollectionError::exhausted(self.len));
        }

        self.slots
            .try_reserve(1)
            .map_err(|err| CollectionError::from_reserve(err, self.len))
    }

    /// Stores `node`, reusing a vacant slot when one exists.
    ///
    #[cfg(test)]
    pub(crate) fn try_insert(&mut self, node: N) -> Result<NodeId, CollectionError> {
        self.try_reserve_one()?;
        Ok(self.insert_reserved(node))
    }

    /// Stores `node` after a successful [`try_reserve_one`](Self::try_reserve_one).
    ///
    /// Never allocates when the reservation was made.
    ///
    pub(crate) fn insert_reserved(&mut self, node: N) -> NodeId {
        let id = match self.free_head {
            Some(id) => {
                let slot = &mut self.slots[id.index()];
                let next_free = match slot {
                    Slot::Vacant { next_free } => *next_free,
                    Slot::Occupied(_) => panic!("free chain points at occupied slot {id:?}"),
                };
                *slot = Slot::Occupied(node);
                self.free_head = next_free;
                id
            }
            None => {
                let id = NodeId(self.slots.len() as u32);
                self.slots.push(Slot::Occupied(node));
                id
            }
        };

        self.len += 1;
        id
    }

    /// Removes the node at `id` and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not address a live node.
    ///
    pub(crate) fn remove(&mut self, id: NodeId) -> N {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(_)) => {}
            _ => panic!("node {id:?} is not allocated"),
        }

        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };

        match mem::replace(&mut self.slots[id.index()], vacant) {
            Slot::Occupied(node) => {
                self.free_head = Some(id);
                self.len -= 1;
                node
            }
            Slot::Vacant { .. } => unreachable!(),
        }
    }

    /// Removes every node, keeping the allocated capacity.
    ///
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = N> + '_ {
        self.free_head = None;
        self.len = 0;

        self.slots.drain(..).filter_map(|slot| match slot {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        })
    }
}

impl<N> Default for NodeArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Index<NodeId> for NodeArena<N> {
    type Output = N;

    #[inline]
    fn index(&self, id: NodeId) -> &N {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(node)) => node,
            _ => panic!("node {id:?} is not allocated"),
        }
    }
}

impl<N> IndexMut<NodeId> for NodeArena<N> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(node)) => node,
            _ => panic!("node {id:?} is not allocated"),
        }
    }
}
