/// Construction-time settings for the node storage of a collection.
///
/// ```text
/// initial_capacity   nodes reserved up front (fallible)
/// max_nodes          hard budget; reaching it reports ResourceExhausted
/// ```
///
/// The defaults reserve nothing and impose no budget, so the collection is
/// only bounded by what the allocator is willing to hand out.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionCreateOptions {
    initial_capacity: usize,
    max_nodes: Option<usize>,
}

impl CollectionCreateOptions {
    pub fn new() -> Self {
        CollectionCreateOptions {
            initial_capacity: 0,
            max_nodes: None,
        }
    }

    /// Reserve room for `capacity` nodes when the collection is created.
    ///
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Refuse to hold more than `max_nodes` nodes at a time.
    ///
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }
}
