use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::data_structures::internal::{NodeArena, NodeId};
use crate::data_structures::{CollectionCreateOptions, DefaultOperations, ListOperations};
use crate::error::CollectionError;

const PREV: usize = 0;
const NEXT: usize = 1;

/// End of the list an operation works on. The discriminant is the index into
/// `ListState::ends`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Head = 0,
    Tail = 1,
}

impl End {
    #[inline]
    fn opposite(self) -> End {
        match self {
            End::Head => End::Tail,
            End::Tail => End::Head,
        }
    }

    /// Entry link pointing off the list at this end.
    ///
    #[inline]
    fn outward(self) -> usize {
        match self {
            End::Head => PREV,
            End::Tail => NEXT,
        }
    }

    #[inline]
    fn inward(self) -> usize {
        match self {
            End::Head => NEXT,
            End::Tail => PREV,
        }
    }
}

struct ListEntry<T> {
    data: T,
    link: [Option<NodeId>; 2],
}

struct ListState<T> {
    ends: [Option<NodeId>; 2],
    nodes: NodeArena<ListEntry<T>>,
}

///
/// Doubly linked list with head/tail enqueue and dequeue, guarded by one
/// exclusive lock.
///
/// ```text
///            ends[Head]                         ends[Tail]
///                │                                  │
///                ▼                                  ▼
///   None ◄──── [ A ] ◄────► [ B ] ◄────► [ C ] ────► None
///             PREV  NEXT
/// ```
///
/// Every operation takes the lock for O(1) structural work (amortized when
/// node storage grows), so operations from different threads are totally
/// ordered. The reference-count hooks run under the lock.
///
/// Ownership of payload references:
///
/// | Operation          | Hook called        |
/// |--------------------|--------------------|
/// | `enqueue_*`        | `ref_count_inc`    |
/// | `dequeue_*`        | none (moves to caller) |
/// | `empty`, drop      | `ref_count_dec` per entry |
///
pub struct LockedList<T, O = DefaultOperations>
where
    O: ListOperations<T>,
{
    state: Mutex<ListState<T>>,
    operations: O,
}

impl<T, O> LockedList<T, O>
where
    O: ListOperations<T>,
{
    pub fn new(operations: O) -> Self {
        LockedList {
            state: Mutex::new(ListState {
                ends: [None, None],
                nodes: NodeArena::new(),
            }),
            operations,
        }
    }

    /// Creates an empty list with pre-reserved node storage and an optional
    /// node budget.
    ///
    pub fn try_with_options(
        operations: O,
        options: &CollectionCreateOptions,
    ) -> Result<Self, CollectionError> {
        let nodes = NodeArena::try_with_options(options)?;

        debug!(
            initial_capacity = options.initial_capacity(),
            max_nodes = ?options.max_nodes(),
            "Created list"
        );

        Ok(LockedList {
            state: Mutex::new(ListState {
                ends: [None, None],
                nodes,
            }),
            operations,
        })
    }

    /// Adds `data` in front of the current head.
    ///
    /// On [`CollectionError::ResourceExhausted`] the list is unmodified and
    /// `data` is dropped without its reference count being touched.
    ///
    pub fn enqueue_head(&self, data: T) -> Result<(), CollectionError> {
        self.enqueue(End::Head, data)
    }

    /// Adds `data` after the current tail.
    ///
    pub fn enqueue_tail(&self, data: T) -> Result<(), CollectionError> {
        self.enqueue(End::Tail, data)
    }

    /// Takes the payload at the head. The list's reference moves to the
    /// caller.
    ///
    pub fn dequeue_head(&self) -> Option<T> {
        self.dequeue(End::Head)
    }

    /// Takes the payload at the tail. The list's reference moves to the
    /// caller.
    ///
    pub fn dequeue_tail(&self) -> Option<T> {
        self.dequeue(End::Tail)
    }

    /// Drops every entry, releasing one reference per payload.
    ///
    pub fn empty(&self) {
        let mut state = self.state.lock();
        let released = Self::release_all(&mut state, &self.operations);

        trace!(released, "Emptied list");
    }

    pub fn len(&self) -> usize {
        self.state.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn operations(&self) -> &O {
        &self.operations
    }

    fn enqueue(&self, end: End, data: T) -> Result<(), CollectionError> {
        let mut state = self.state.lock();

        if let Err(err) = state.nodes.try_reserve_one() {
            error!(nodes = state.nodes.len(), "Failed to allocate list entry");
            return Err(err);
        }

        self.operations.ref_count_inc(&data);

        let old = state.ends[end as usize];
        let mut link = [None, None];
        link[end.inward()] = old;

        let id = state.nodes.insert_reserved(ListEntry { data, link });

        match old {
            Some(old) => state.nodes[old].link[end.outward()] = Some(id),
            None => state.ends[end.opposite() as usize] = Some(id),
        }
        state.ends[end as usize] = Some(id);

        trace!(?end, len = state.nodes.len(), "Enqueued entry");
        Ok(())
    }

    fn dequeue(&self, end: End) -> Option<T> {
        let mut state = self.state.lock();

        let id = state.ends[end as usize]?;
        let entry = state.nodes.remove(id);
        let inward = entry.link[end.inward()];

        match inward {
            Some(neighbour) => state.nodes[neighbour].link[end.outward()] = None,
            None => state.ends[end.opposite() as usize] = None,
        }
        state.ends[end as usize] = inward;

        trace!(?end, len = state.nodes.len(), "Dequeued entry");
        Some(entry.data)
    }

    fn release_all(state: &mut ListState<T>, operations: &O) -> usize {
        let mut link = state.ends[End::Head as usize];
        let mut released = 0;

        while let Some(id) = link {
            let entry = state.nodes.remove(id);
            link = entry.link[NEXT];
            operations.ref_count_dec(&entry.data);
            released += 1;
        }

        state.ends = [None, None];
        released
    }
}

impl<T, O> Default for LockedList<T, O>
where
    O: ListOperations<T> + Default,
{
    fn default() -> Self {
        Self::new(O::default())
    }
}

impl<T, O> Drop for LockedList<T, O>
where
    O: ListOperations<T>,
{
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.nodes.len() > 0 {
            debug!(remaining = state.nodes.len(), "Releasing list entries");
        }

        Self::release_all(state, &self.operations);
    }
}

impl<T, O> fmt::Debug for LockedList<T, O>
where
    O: ListOperations<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedList")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
