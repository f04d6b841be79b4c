use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{AvlNode, Side};

/// The core AVL tree backing `AvlMap`.
///
/// Structural routines follow a return-the-new-root protocol: each takes the handle of a subtree
/// root and returns the handle of whatever node roots that subtree afterwards. Callers store the
/// returned handle in the parent's child link (or in `root`).
#[derive(Clone, Debug)]
pub(crate) struct RawAvlMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<AvlNode<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

/// Path element for tracking the descent during mutations.
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// Child link we descended through.
    side: Side,
}

/// Stack of path elements from the root down to the mutation point.
type Path = SmallVec<[PathElement; 32]>;

impl<K, V> RawAvlMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of entries in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree contains no entries.
    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clears all entries from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns the root handle, if any.
    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &AvlNode<K, V> {
        self.nodes.get(handle)
    }

    /// Height of the whole tree; zero when empty.
    pub(crate) fn height(&self) -> u32 {
        self.subtree_height(self.root)
    }

    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left() {
            current = left;
        }
        let node = self.nodes.get(current);
        Some((node.key(), node.value()))
    }

    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right() {
            current = right;
        }
        let node = self.nodes.get(current);
        Some((node.key(), node.value()))
    }

    fn subtree_height(&self, handle: Option<Handle>) -> u32 {
        handle.map_or(0, |h| self.nodes.get(h).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.subtree_height(node.left()).max(self.subtree_height(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// `height(left) - height(right)` at `handle`.
    fn balance_factor(&self, handle: Handle) -> i64 {
        let node = self.nodes.get(handle);
        i64::from(self.subtree_height(node.left())) - i64::from(self.subtree_height(node.right()))
    }

    /// Rotates the subtree at `node` to the right and returns its new root (the former left child).
    fn rotate_right(&mut self, node: Handle) -> Handle {
        let pivot = self.nodes.get(node).left().expect("`RawAvlMap::rotate_right()` - node has no left child!");
        let inner = self.nodes.get(pivot).right();

        self.nodes.get_mut(node).set_child(Side::Left, inner);
        self.nodes.get_mut(pivot).set_child(Side::Right, Some(node));
        self.update_height(node);
        self.update_height(pivot);

        trace!(?node, ?pivot, "rotated right");
        pivot
    }

    /// Rotates the subtree at `node` to the left and returns its new root (the former right child).
    fn rotate_left(&mut self, node: Handle) -> Handle {
        let pivot = self.nodes.get(node).right().expect("`RawAvlMap::rotate_left()` - node has no right child!");
        let inner = self.nodes.get(pivot).left();

        self.nodes.get_mut(node).set_child(Side::Right, inner);
        self.nodes.get_mut(pivot).set_child(Side::Left, Some(node));
        self.update_height(node);
        self.update_height(pivot);

        trace!(?node, ?pivot, "rotated left");
        pivot
    }

    /// Restores the balance invariant at `node` after a removal below it.
    ///
    /// Removal has no inserted key to steer by, so the double-rotation cases are picked from the
    /// child's balance factor instead.
    fn rebalance(&mut self, node: Handle) -> Handle {
        self.update_height(node);
        let balance = self.balance_factor(node);

        if balance > 1 {
            let left = self.nodes.get(node).left().expect("`RawAvlMap::rebalance()` - left-heavy node without left child!");
            if self.balance_factor(left) < 0 {
                let pivot = self.rotate_left(left);
                self.nodes.get_mut(node).set_child(Side::Left, Some(pivot));
            }
            return self.rotate_right(node);
        }

        if balance < -1 {
            let right =
                self.nodes.get(node).right().expect("`RawAvlMap::rebalance()` - right-heavy node without right child!");
            if self.balance_factor(right) > 0 {
                let pivot = self.rotate_right(right);
                self.nodes.get_mut(node).set_child(Side::Right, Some(pivot));
            }
            return self.rotate_left(node);
        }

        node
    }
}

impl<K: Ord, V> RawAvlMap<K, V> {
    /// Searches for a key and returns the handle of its node.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.nodes.get(self.search(key)?);
        Some((node.key(), node.value()))
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut())
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present; the node is then reused in place.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut path: Path = SmallVec::new();
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get_mut(handle);
            let side = match key.cmp(node.key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(core::mem::replace(node.value_mut(), value)),
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        }

        let inserted = self.nodes.alloc(AvlNode::new(key, value));

        // Re-link every ancestor to the (possibly rotated) subtree below it, bottom-up.
        let mut child = inserted;
        while let Some(PathElement { node, side }) = path.pop() {
            self.nodes.get_mut(node).set_child(side, Some(child));
            child = self.rebalance_after_insert(node, inserted);
        }
        self.root = Some(child);

        None
    }

    /// Restores the balance invariant at `node` after `inserted` was added below it.
    ///
    /// The four cases are tried in order: left-left, right-right, left-right, right-left, each
    /// chosen by comparing the inserted key with the heavy child's key.
    fn rebalance_after_insert(&mut self, node: Handle, inserted: Handle) -> Handle {
        self.update_height(node);
        let balance = self.balance_factor(node);
        let (left, right) = {
            let n = self.nodes.get(node);
            (n.left(), n.right())
        };

        match (balance, left, right) {
            (2.., Some(left), _) if self.compare(inserted, left) == Ordering::Less => self.rotate_right(node),
            (..=-2, _, Some(right)) if self.compare(inserted, right) == Ordering::Greater => self.rotate_left(node),
            (2.., Some(left), _) if self.compare(inserted, left) == Ordering::Greater => {
                let pivot = self.rotate_left(left);
                self.nodes.get_mut(node).set_child(Side::Left, Some(pivot));
                self.rotate_right(node)
            }
            (..=-2, _, Some(right)) if self.compare(inserted, right) == Ordering::Less => {
                let pivot = self.rotate_right(right);
                self.nodes.get_mut(node).set_child(Side::Right, Some(pivot));
                self.rotate_left(node)
            }
            _ => node,
        }
    }

    fn compare(&self, a: Handle, b: Handle) -> Ordering {
        self.nodes.get(a).key().cmp(self.nodes.get(b).key())
    }

    /// Removes a key from the tree, returning the stored key and value if it was present.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut path: Path = SmallVec::new();
        let mut current = self.root;

        let target = loop {
            let handle = current?;
            let node = self.nodes.get(handle);
            let side = match key.cmp(node.key().borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => break handle,
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        };

        let (left, right) = {
            let node = self.nodes.get(target);
            (node.left(), node.right())
        };

        let (entry, replacement) = if let (Some(_), Some(right)) = (left, right) {
            // Two children: pull the in-order successor's entry up into `target` and unlink the
            // successor instead. The successor never has a left child.
            path.push(PathElement {
                node: target,
                side: Side::Right,
            });
            let mut successor = right;
            while let Some(next) = self.nodes.get(successor).left() {
                path.push(PathElement {
                    node: successor,
                    side: Side::Left,
                });
                successor = next;
            }
            let (key, value, _, successor_right) = self.nodes.take(successor).into_parts();
            (self.nodes.get_mut(target).replace_entry(key, value), successor_right)
        } else {
            let (key, value, left, right) = self.nodes.take(target).into_parts();
            ((key, value), left.or(right))
        };

        let mut child = replacement;
        while let Some(PathElement { node, side }) = path.pop() {
            self.nodes.get_mut(node).set_child(side, child);
            child = Some(self.rebalance(node));
        }
        self.root = child;

        Some(entry)
    }
}
