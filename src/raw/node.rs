use super::handle::Handle;

/// Which child link of a node a traversal followed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A single AVL node. Children are owned through the arena; each handle appears under exactly one
/// parent, and the root handle is owned by the tree.
#[derive(Clone, Debug)]
pub(crate) struct AvlNode<K, V> {
    key: K,
    value: V,
    left: Option<Handle>,
    right: Option<Handle>,
    // Height of the subtree rooted here; a leaf has height 1 and an absent child counts as 0.
    height: u32,
}

impl<K, V> AvlNode<K, V> {
    /// Creates a detached leaf.
    pub(crate) const fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        }
    }

    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    pub(crate) const fn value(&self) -> &V {
        &self.value
    }

    pub(crate) const fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) const fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) const fn height(&self) -> u32 {
        self.height
    }

    pub(crate) const fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    /// Replaces the entry stored in this node, returning the previous one.
    pub(crate) fn replace_entry(&mut self, key: K, value: V) -> (K, V) {
        (core::mem::replace(&mut self.key, key), core::mem::replace(&mut self.value, value))
    }

    /// Consumes the node, returning its entry and both child links.
    pub(crate) fn into_parts(self) -> (K, V, Option<Handle>, Option<Handle>) {
        (self.key, self.value, self.left, self.right)
    }
}
