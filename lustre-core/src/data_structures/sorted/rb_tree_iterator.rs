use std::iter::FusedIterator;

use crate::data_structures::TreeOperations;
use crate::data_structures::internal::NodeId;
use crate::data_structures::sorted::rb_tree::{LEFT, RIGHT, RbTree};

/// Depth of the ancestor stack kept by [`RbTreeIterator`].
///
/// A red-black tree with `n` nodes is at most `2 * log2(n + 1)` tall and
/// node ids are `u32`, so 64 entries cover every tree that can be built.
/// Exceeding it means the tree is corrupt and the iterator panics.
///
pub const RB_TREE_HEIGHT_LIMIT: usize = 64;

/// Cursor over an [`RbTree`] with an explicit ancestor stack.
///
/// ```text
///            8            first():  path = [8, 4]   current = 2
///          /   \          next():   2 has no right child, pop 4
///         4     12                  (came from its left)  current = 4
///        / \                        path = [8]
///       2   6
/// ```
///
/// `first`/`last` (re)position the cursor at the minimum/maximum; `next` and
/// `prev` step in order and return `None` once the traversal runs off either
/// end. An exhausted cursor stays exhausted until repositioned.
///
/// The cursor borrows the tree, so the tree cannot be modified while the
/// cursor is alive.
///
pub struct RbTreeIterator<'a, T, O>
where
    O: TreeOperations<T>,
{
    tree: &'a RbTree<T, O>,
    current: Option<NodeId>,
    path: [Option<NodeId>; RB_TREE_HEIGHT_LIMIT],
    top: usize,
}

impl<'a, T, O> RbTreeIterator<'a, T, O>
where
    O: TreeOperations<T>,
{
    pub(crate) fn new(tree: &'a RbTree<T, O>) -> Self {
        RbTreeIterator {
            tree,
            current: None,
            path: [None; RB_TREE_HEIGHT_LIMIT],
            top: 0,
        }
    }

    /// Positions the cursor on the smallest payload.
    ///
    pub fn first(&mut self) -> Option<&'a T> {
        self.start(LEFT)
    }

    /// Positions the cursor on the largest payload.
    ///
    pub fn last(&mut self) -> Option<&'a T> {
        self.start(RIGHT)
    }

    /// Moves to the in-order successor.
    ///
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a T> {
        self.step(RIGHT)
    }

    /// Moves to the in-order predecessor.
    ///
    pub fn prev(&mut self) -> Option<&'a T> {
        self.step(LEFT)
    }

    /// Payload under the cursor.
    ///
    pub fn current(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.current.map(|id| &tree.nodes[id].data)
    }

    fn start(&mut self, dir: usize) -> Option<&'a T> {
        let tree = self.tree;

        self.top = 0;
        self.current = tree.root;

        if let Some(mut id) = self.current {
            while let Some(child) = tree.nodes[id].link[dir] {
                self.push(id);
                id = child;
            }
            self.current = Some(id);
        }

        self.current()
    }

    fn step(&mut self, dir: usize) -> Option<&'a T> {
        let tree = self.tree;
        let id = self.current?;

        if let Some(mut next) = tree.nodes[id].link[dir] {
            // Descend into the subtree, then run to its far edge.
            //
            self.push(id);
            while let Some(child) = tree.nodes[next].link[dir ^ 1] {
                self.push(next);
                next = child;
            }
            self.current = Some(next);
        } else {
            // Climb until we arrive from the other side.
            //
            let mut last = id;
            loop {
                let Some(parent) = self.pop() else {
                    self.current = None;
                    break;
                };

                self.current = Some(parent);
                if tree.nodes[parent].link[dir] != Some(last) {
                    break;
                }
                last = parent;
            }
        }

        self.current()
    }

    #[inline]
    fn push(&mut self, id: NodeId) {
        assert!(
            self.top < RB_TREE_HEIGHT_LIMIT,
            "tree deeper than RB_TREE_HEIGHT_LIMIT ({RB_TREE_HEIGHT_LIMIT})"
        );
        self.path[self.top] = Some(id);
        self.top += 1;
    }

    #[inline]
    fn pop(&mut self) -> Option<NodeId> {
        if self.top == 0 {
            return None;
        }
        self.top -= 1;
        self.path[self.top].take()
    }
}

/// In-order iterator returned by [`RbTree::iter`].
///
/// Runs two cursors from opposite ends and stops when they have handed out
/// `len()` payloads between them.
///
pub struct Iter<'a, T, O>
where
    O: TreeOperations<T>,
{
    front: RbTreeIterator<'a, T, O>,
    back: RbTreeIterator<'a, T, O>,
    front_started: bool,
    back_started: bool,
    remaining: usize,
}

impl<'a, T, O> Iter<'a, T, O>
where
    O: TreeOperations<T>,
{
    pub(crate) fn new(tree: &'a RbTree<T, O>) -> Self {
        Iter {
            front: RbTreeIterator::new(tree),
            back: RbTreeIterator::new(tree),
            front_started: false,
            back_started: false,
            remaining: tree.len(),
        }
    }
}

impl<'a, T, O> Iterator for Iter<'a, T, O>
where
    O: TreeOperations<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        if self.front_started {
            self.front.next()
        } else {
            self.front_started = true;
            self.front.first()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, O> DoubleEndedIterator for Iter<'_, T, O>
where
    O: TreeOperations<T>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        if self.back_started {
            self.back.prev()
        } else {
            self.back_started = true;
            self.back.last()
        }
    }
}

impl<T, O> ExactSizeIterator for Iter<'_, T, O> where O: TreeOperations<T> {}

impl<T, O> FusedIterator for Iter<'_, T, O> where O: TreeOperations<T> {}
