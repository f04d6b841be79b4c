use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::raw::{Handle, RawAvlMap};

/// An ordered map based on an [AVL tree].
///
/// Keys must implement [`Ord`]; entries are kept in ascending key order and the tree is rebalanced
/// after every insertion and removal, so that for every node the heights of its two subtrees differ
/// by at most one. Lookups, insertions and removals take O(log n) time.
///
/// Nodes live in an arena and refer to their children by handle, so rotations only rewrite child
/// links and never move entries.
///
/// # Examples
///
/// ```
/// use catalog_index::AvlMap;
///
/// let mut releases = AvlMap::new();
/// releases.insert(2010, "Inception");
/// releases.insert(1999, "The Matrix");
/// releases.insert(2014, "Interstellar");
///
/// let titles: Vec<_> = releases.in_order().map(|(_, title)| *title).collect();
/// assert_eq!(titles, ["The Matrix", "Inception", "Interstellar"]);
///
/// let newest = releases.reverse_order().next();
/// assert_eq!(newest, Some((&2014, &"Interstellar")));
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlMap<K, V> {
    raw: RawAvlMap<K, V>,
}

/// Explicit traversal stack; deep enough for any tree an arena can hold without spilling.
type Stack = SmallVec<[Handle; 64]>;

/// An iterator over the entries of an `AvlMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`AvlMap`]. It walks the tree with explicit
/// stacks rather than recursion and is double-ended, so `.rev()` yields descending key order.
///
/// # Examples
///
/// ```
/// use catalog_index::AvlMap;
///
/// let map = AvlMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: AvlMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawAvlMap<K, V>,
    front: Stack,
    back: Stack,
    remaining: usize,
}

impl<K, V> AvlMap<K, V> {
    /// Makes a new, empty `AvlMap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_index::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        AvlMap { raw: RawAvlMap::new() }
    }

    /// Creates an empty map with room for at least `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlMap {
            raw: RawAvlMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree: zero when empty, one for a single entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_index::AvlMap;
    ///
    /// let map: AvlMap<u32, ()> = (0..7).map(|k| (k, ())).collect();
    /// assert_eq!(map.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> u32 {
        self.raw.height()
    }

    /// Clears the map, removing all entries.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; amortized O(1) per step.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            tree: &self.raw,
            front: SmallVec::new(),
            back: SmallVec::new(),
            remaining: self.raw.len(),
        };
        iter.push_left_spine(self.raw.root());
        iter.push_right_spine(self.raw.root());
        iter
    }

    /// In-order traversal: left subtree, node, right subtree. Ascending by key.
    pub fn in_order(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Reverse in-order traversal: right subtree, node, left subtree. Descending by key.
    ///
    /// Always yields exactly the reverse of [`in_order`](AvlMap::in_order).
    pub fn reverse_order(&self) -> core::iter::Rev<Iter<'_, K, V>> {
        self.iter().rev()
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_index::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.get_key_value(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, a new node is linked in, the tree is rebalanced
    /// and `None` is returned. If the key was present, the value is replaced in place and the old
    /// value is returned; the key itself is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_index::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "c"), Some("a"));
    /// assert_eq!(map.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning the value if the key was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.remove_entry(key)
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.front.push(handle);
            current = self.tree.node(handle).left();
        }
    }

    fn push_right_spine(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.back.push(handle);
            current = self.tree.node(handle).right();
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front.pop()?;
        let tree = self.tree;
        let node = tree.node(handle);
        self.push_left_spine(node.right());
        self.remaining -= 1;

        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.back.pop()?;
        let tree = self.tree;
        let node = tree.node(handle);
        self.push_right_spine(node.left());
        self.remaining -= 1;

        Some((node.key(), node.value()))
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K: 'a, V: 'a> FusedIterator for Iter<'a, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K: Clone, V: Clone> Clone for AvlMap<K, V> {
    fn clone(&self) -> Self {
        AvlMap { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AvlMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
