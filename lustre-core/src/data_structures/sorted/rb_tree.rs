use std::cmp::Ordering;
use std::fmt;
use std::mem;

use tracing::{debug, error, trace};

use crate::data_structures::internal::{NodeArena, NodeId};
use crate::data_structures::sorted::rb_tree_iterator::{Iter, RbTreeIterator};
use crate::data_structures::{CollectionCreateOptions, DefaultOperations, TreeOperations};
use crate::error::CollectionError;

pub(super) const LEFT: usize = 0;
pub(super) const RIGHT: usize = 1;

pub(super) struct RbNode<T> {
    pub(super) red: bool,
    pub(super) data: T,
    pub(super) link: [Option<NodeId>; 2],
}

/// Link holder above a node: either a real node or the false root that
/// sits above the tree during top-down insertion and removal.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Head,
    Node(NodeId),
}

///
/// Red-black tree with top-down insertion and removal.
///
/// The tree keeps its payloads in the order defined by the operations
/// descriptor and never holds two payloads that compare equal.
///
/// NOT internally synchronized: every mutation takes `&mut self`, so sharing
/// a tree between threads requires the caller's own lock, e.g.
/// `Mutex<RbTree<Arc<Inode>, InodeOperations>>`. Iterators borrow the tree,
/// which rules out mutation while a traversal is in progress.
///
// =============================================================================
// TOP-DOWN INSERTION
// =============================================================================
//
// A false root (HEAD) sits above the real root so the root can be rotated
// like any other node. The descent keeps a window of four links:
//
//      t          great-grandparent (link holder for g)
//      │
//      g          grandparent
//      │
//      p          parent
//      │
//      q          cursor
//
// At every step:
//   1. q == NULL                 → hang the new red node here
//   2. q black, both children red → color flip (q red, children black)
//   3. q red and p red           → rotate at g
//        q on the same side as p   single rotation
//        q on the inner side       double rotation
//   4. q equal to the payload     → stop (duplicate or just inserted)
//
// Because violations are repaired on the way down, no upward pass exists.
//
// =============================================================================
// TOP-DOWN REMOVAL
// =============================================================================
//
// The descent pushes a red node down ahead of the cursor so the node that
// is finally unlinked is always red (or the only node left):
//
//   q black, next child black:
//     q's other child red        → single rotation at q
//     sibling s of q:
//       both children black      → color flip p/s/q
//       s has a red child        → single or double rotation at p
//
// Equal keys keep going right, so the cursor ends on the in-order
// successor of the match. The successor's payload is moved into the
// matched node and the successor node is unlinked.
//
pub struct RbTree<T, O = DefaultOperations>
where
    O: TreeOperations<T>,
{
    pub(super) root: Option<NodeId>,
    pub(super) nodes: NodeArena<RbNode<T>>,
    operations: O,
}

impl<T, O> RbTree<T, O>
where
    O: TreeOperations<T>,
{
    /// Creates an empty tree. Nothing is allocated until the first insert.
    ///
    pub fn new(operations: O) -> Self {
        RbTree {
            root: None,
            nodes: NodeArena::new(),
            operations,
        }
    }

    /// Creates an empty tree with pre-reserved node storage and an optional
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
            "Created tree"
        );

        Ok(RbTree {
            root: None,
            nodes,
            operations,
        })
    }

    /// Number of payloads in the tree. O(1).
    ///
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn operations(&self) -> &O {
        &self.operations
    }

    /// Finds the payload matching `key` according to the find comparator.
    ///
    pub fn find(&self, key: &O::Key) -> Option<&T> {
        let id = self.locate(|data| self.operations.find_compare(data, key))?;
        Some(&self.nodes[id].data)
    }

    pub fn contains(&self, key: &O::Key) -> bool {
        self.find(key).is_some()
    }

    /// Smallest payload.
    ///
    pub fn first(&self) -> Option<&T> {
        self.iterator().first()
    }

    /// Largest payload.
    ///
    pub fn last(&self) -> Option<&T> {
        self.iterator().last()
    }

    /// Inserts `data`.
    ///
    /// Inserting a payload equal to one already present is a successful
    /// no-op: the stored payload is kept and `data` is dropped without
    /// touching its reference count.
    ///
    /// Returns [`CollectionError::ResourceExhausted`] when no node can be
    /// allocated; the tree is left unmodified.
    ///
    pub fn insert(&mut self, data: T) -> Result<(), CollectionError> {
        // Reserve before descending: the descent rebalances as it goes and
        // must not be abandoned half way.
        //
        if let Err(err) = self.nodes.try_reserve_one() {
            if self
                .locate(|stored| self.operations.compare(stored, &data))
                .is_some()
            {
                return Ok(());
            }

            error!(nodes = self.nodes.len(), "Failed to allocate tree node");
            return Err(err);
        }

        let Some(root) = self.root else {
            let id = self.new_node(data);
            self.nodes[id].red = false;
            self.root = Some(id);

            trace!(len = self.len(), "Inserted root");
            return Ok(());
        };

        let mut t = Parent::Head;
        let mut g: Option<NodeId> = None;
        let mut p: Option<NodeId> = None;
        let mut q: Option<NodeId> = Some(root);
        let mut dir = LEFT;
        let mut last = LEFT;
        let mut pending = Some(data);

        loop {
            let node = match q {
                None => {
                    // The root exists, so a null link always has a parent.
                    //
                    let parent = p.expect("null link reached without a parent");
                    let payload = pending.take().expect("payload already placed");
                    let id = self.new_node(payload);
                    self.nodes[parent].link[dir] = Some(id);
                    id
                }
                Some(id) => {
                    let [left, right] = self.nodes[id].link;
                    if let (Some(left), Some(right)) = (left, right)
                        && self.nodes[left].red
                        && self.nodes[right].red
                    {
                        self.nodes[id].red = true;
                        self.nodes[left].red = false;
                        self.nodes[right].red = false;
                    }
                    id
                }
            };

            // Red violation between node and its parent.
            //
            if let Some(parent) = p
                && self.nodes[node].red
                && self.nodes[parent].red
            {
                // A red parent is never the root, so the grandparent exists.
                //
                let grand = g.expect("red parent without a grandparent");
                let dir2 = if self.child(t, RIGHT) == Some(grand) {
                    RIGHT
                } else {
                    LEFT
                };

                let rotated = if self.nodes[parent].link[last] == Some(node) {
                    self.rotate_single(grand, last ^ 1)
                } else {
                    self.rotate_double(grand, last ^ 1)
                };
                self.set_child(t, dir2, Some(rotated));
            }

            let Some(payload) = pending.as_ref() else {
                // Just inserted.
                //
                break;
            };

            let order = self.operations.compare(&self.nodes[node].data, payload);
            if order == Ordering::Equal {
                break;
            }

            last = dir;
            dir = if order == Ordering::Less { RIGHT } else { LEFT };

            if let Some(grand) = g {
                t = Parent::Node(grand);
            }
            g = p;
            p = Some(node);
            q = self.nodes[node].link[dir];
        }

        self.paint_root_black();

        if pending.is_none() {
            trace!(len = self.len(), "Inserted node");
        }

        Ok(())
    }

    /// Removes the payload equal to `data` according to the comparator.
    ///
    pub fn remove(&mut self, data: &T) -> Result<(), CollectionError> {
        self.remove_by(|operations, stored| operations.compare(stored, data))
    }

    /// Removes the payload matching `key` according to the find comparator.
    ///
    pub fn remove_key(&mut self, key: &O::Key) -> Result<(), CollectionError> {
        self.remove_by(|operations, stored| operations.find_compare(stored, key))
    }

    /// Releases every payload and frees every node.
    ///
    pub fn clear(&mut self) {
        if self.root.take().is_none() {
            return;
        }

        debug!(remaining = self.nodes.len(), "Releasing tree entries");

        let operations = &self.operations;
        for node in self.nodes.drain() {
            operations.ref_count_dec(&node.data);
        }
    }

    /// Creates a cursor for a manual traversal session.
    ///
    pub fn iterator(&self) -> RbTreeIterator<'_, T, O> {
        RbTreeIterator::new(self)
    }

    /// Iterates payloads in comparator order. Double ended.
    ///
    pub fn iter(&self) -> Iter<'_, T, O> {
        Iter::new(self)
    }

    /// Verifies the tree and returns its black height.
    ///
    /// Checks that the root is black, that no red node has a red child,
    /// that every path to a null link crosses the same number of black
    /// nodes, that payloads are strictly ordered and that the element count
    /// matches the number of reachable nodes.
    ///
    /// # Panics
    ///
    /// Panics on the first violated invariant.
    ///
    pub fn black_height(&self) -> usize {
        assert!(
            !self.is_red(self.root),
            "red-black violation: the root is red"
        );

        let mut reachable = 0;
        let height = self.check_subtree(self.root, None, None, &mut reachable);

        assert_eq!(
            reachable,
            self.len(),
            "element count does not match reachable nodes"
        );

        height
    }

    fn check_subtree(
        &self,
        link: Option<NodeId>,
        lower: Option<&T>,
        upper: Option<&T>,
        reachable: &mut usize,
    ) -> usize {
        let Some(id) = link else {
            return 1;
        };

        let node = &self.nodes[id];
        *reachable += 1;

        if node.red {
            assert!(
                !self.is_red(node.link[LEFT]) && !self.is_red(node.link[RIGHT]),
                "red-black violation: red node with a red child"
            );
        }

        if let Some(lower) = lower {
            assert_eq!(
                self.operations.compare(lower, &node.data),
                Ordering::Less,
                "ordering violation: left subtree is not smaller"
            );
        }
        if let Some(upper) = upper {
            assert_eq!(
                self.operations.compare(&node.data, upper),
                Ordering::Less,
                "ordering violation: right subtree is not greater"
            );
        }

        let left = self.check_subtree(node.link[LEFT], lower, Some(&node.data), reachable);
        let right = self.check_subtree(node.link[RIGHT], Some(&node.data), upper, reachable);

        assert_eq!(left, right, "red-black violation: unequal black height");

        left + usize::from(!node.red)
    }

    fn remove_by<F>(&mut self, mut compare: F) -> Result<(), CollectionError>
    where
        F: FnMut(&O, &T) -> Ordering,
    {
        if self.root.is_none() {
            return Err(CollectionError::NotFound);
        }

        // g and p start on the head and are overwritten before any use that
        // needs a real node.
        //
        let mut q = Parent::Head;
        let mut p = Parent::Head;
        let mut g = Parent::Head;
        let mut found: Option<NodeId> = None;
        let mut dir = RIGHT;

        while let Some(next) = self.child(q, dir) {
            let last = dir;

            g = p;
            p = q;
            q = Parent::Node(next);

            let order = compare(&self.operations, &self.nodes[next].data);
            if order == Ordering::Equal {
                found = Some(next);
            }
            dir = if order == Ordering::Greater { LEFT } else { RIGHT };

            // Push the red node down.
            //
            if self.nodes[next].red || self.is_red(self.nodes[next].link[dir]) {
                continue;
            }

            if self.is_red(self.nodes[next].link[dir ^ 1]) {
                let rotated = self.rotate_single(next, dir);
                self.set_child(p, last, Some(rotated));
                p = Parent::Node(rotated);
                continue;
            }

            let Some(sibling) = self.child(p, last ^ 1) else {
                continue;
            };

            // The head has no left link, so a sibling means p is a node.
            //
            let Parent::Node(parent) = p else {
                unreachable!("sibling under the head");
            };

            let near = self.nodes[sibling].link[last];
            let far = self.nodes[sibling].link[last ^ 1];

            if !self.is_red(near) && !self.is_red(far) {
                self.nodes[parent].red = false;
                self.nodes[sibling].red = true;
                self.nodes[next].red = true;
            } else {
                let dir2 = if self.child(g, RIGHT) == Some(parent) {
                    RIGHT
                } else {
                    LEFT
                };

                let rotated = if self.is_red(near) {
                    self.rotate_double(parent, last)
                } else {
                    self.rotate_single(parent, last)
                };
                self.set_child(g, dir2, Some(rotated));

                self.nodes[next].red = true;
                self.nodes[rotated].red = true;

                let [left, right] = self.nodes[rotated].link;
                let left = left.expect("rotation left no left child");
                let right = right.expect("rotation left no right child");
                self.nodes[left].red = false;
                self.nodes[right].red = false;
            }
        }

        let result = match (found, q) {
            (Some(found), Parent::Node(successor)) => {
                let side = if self.child(p, RIGHT) == Some(successor) {
                    RIGHT
                } else {
                    LEFT
                };
                let replacement = match self.nodes[successor].link {
                    [None, right] => right,
                    [left, _] => left,
                };
                self.set_child(p, side, replacement);

                let mut removed = self.nodes.remove(successor);
                if found != successor {
                    mem::swap(&mut self.nodes[found].data, &mut removed.data);
                }
                self.operations.ref_count_dec(&removed.data);

                trace!(len = self.len(), "Removed node");
                Ok(())
            }
            _ => Err(CollectionError::NotFound),
        };

        self.paint_root_black();

        result
    }

    fn locate<F>(&self, mut compare: F) -> Option<NodeId>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut link = self.root;

        while let Some(id) = link {
            let node = &self.nodes[id];
            link = match compare(&node.data) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.link[RIGHT],
                Ordering::Greater => node.link[LEFT],
            };
        }

        None
    }

    /// Stores a new red node. The slot must have been reserved.
    ///
    fn new_node(&mut self, data: T) -> NodeId {
        self.operations.ref_count_inc(&data);
        self.nodes.insert_reserved(RbNode {
            red: true,
            data,
            link: [None, None],
        })
    }

    #[inline]
    fn is_red(&self, link: Option<NodeId>) -> bool {
        link.is_some_and(|id| self.nodes[id].red)
    }

    #[inline]
    fn child(&self, parent: Parent, dir: usize) -> Option<NodeId> {
        match parent {
            Parent::Head if dir == RIGHT => self.root,
            Parent::Head => None,
            Parent::Node(id) => self.nodes[id].link[dir],
        }
    }

    #[inline]
    fn set_child(&mut self, parent: Parent, dir: usize, child: Option<NodeId>) {
        match parent {
            Parent::Head => {
                assert_eq!(dir, RIGHT, "the head only has a right link");
                self.root = child;
            }
            Parent::Node(id) => self.nodes[id].link[dir] = child,
        }
    }

    fn paint_root_black(&mut self) {
        if let Some(root) = self.root {
            self.nodes[root].red = false;
        }
    }

    // Rotates `root` towards `dir`; the child on the other side takes its
    // place. The old root turns red, the new one black.
    //
    //        root                 save
    //       /    \               /    \
    //     (a)    save   ──►   root    (c)
    //            /  \         /  \
    //          (b)  (c)     (a)  (b)
    //
    fn rotate_single(&mut self, root: NodeId, dir: usize) -> NodeId {
        let save = self.nodes[root].link[dir ^ 1]
            .expect("single rotation without a child to lift");

        self.nodes[root].link[dir ^ 1] = self.nodes[save].link[dir];
        self.nodes[save].link[dir] = Some(root);
        self.nodes[root].red = true;
        self.nodes[save].red = false;

        save
    }

    fn rotate_double(&mut self, root: NodeId, dir: usize) -> NodeId {
        let child = self.nodes[root].link[dir ^ 1]
            .expect("double rotation without a child to lift");

        let lifted = self.rotate_single(child, dir ^ 1);
        self.nodes[root].link[dir ^ 1] = Some(lifted);

        self.rotate_single(root, dir)
    }
}

impl<T, O> Default for RbTree<T, O>
where
    O: TreeOperations<T> + Default,
{
    fn default() -> Self {
        Self::new(O::default())
    }
}

impl<T, O> Drop for RbTree<T, O>
where
    O: TreeOperations<T>,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, O> fmt::Debug for RbTree<T, O>
where
    T: fmt::Debug,
    O: TreeOperations<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, O> IntoIterator for &'a RbTree<T, O>
where
    O: TreeOperations<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, O>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
