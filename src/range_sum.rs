//! Fixed-size range-sum array with logarithmic point update and inclusive range query.

use smallvec::SmallVec;
use tracing::debug;

use crate::error::{IndexError, Result};

/// Element types a [`RangeSumArray`] can add up.
///
/// `checked_sum` returns `None` when the sum does not fit: integer overflow, or a float sum that
/// is not finite.
pub trait Summand: Copy + Default {
    /// Adds two values, or `None` if the result cannot be represented.
    fn checked_sum(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_summand_int {
    ($($t:ty),*) => {
        $(impl Summand for $t {
            #[inline]
            fn checked_sum(self, rhs: Self) -> Option<Self> {
                self.checked_add(rhs)
            }
        })*
    };
}

macro_rules! impl_summand_float {
    ($($t:ty),*) => {
        $(impl Summand for $t {
            #[inline]
            fn checked_sum(self, rhs: Self) -> Option<Self> {
                Some(self + rhs).filter(|sum| sum.is_finite())
            }
        })*
    };
}

impl_summand_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_summand_float!(f32, f64);

/// A fixed-capacity array supporting O(log n) point updates and O(log n) inclusive range sums.
///
/// The layout is an implicit binary tree of `2n` slots: leaves `[n, 2n)` hold the values and each
/// internal slot `i` in `[1, n)` holds `tree[2i] + tree[2i + 1]`. Slot 0 is unused. Capacity is
/// fixed at construction.
///
/// All additions are checked. A build, update or query whose sum would not fit in `T` fails with
/// [`IndexError::SumOverflow`] and leaves the array as it was.
///
/// # Examples
///
/// ```
/// use catalog_index::RangeSumArray;
///
/// let mut sums = RangeSumArray::new(&[1, 3, 5, 7, 9, 11]).unwrap();
/// assert_eq!(sums.query(1, 3), Ok(15));
///
/// sums.update(1, 10).unwrap();
/// assert_eq!(sums.query(1, 3), Ok(22));
/// assert!(sums.query(4, 6).is_err());
///
/// assert!(RangeSumArray::new(&[i64::MAX, 1]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeSumArray<T> {
    len: usize,
    tree: Vec<T>,
}

impl<T: Summand> RangeSumArray<T> {
    /// Builds the array from `values` bottom-up.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::SumOverflow`] if any internal sum does not fit in `T`.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn new(values: &[T]) -> Result<Self> {
        let len = values.len();
        let mut tree = vec![T::default(); 2 * len];
        tree[len..].copy_from_slice(values);
        for i in (1..len).rev() {
            tree[i] = add(tree[2 * i], tree[2 * i + 1])?;
        }
        Ok(Self { len, tree })
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The current values, in index order.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.tree[self.len..]
    }

    /// Returns the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IndexOutOfBounds`] if `index >= len`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.tree[self.len + index])
    }

    /// Sum of every element; the default value when empty.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::SumOverflow`] if the total does not fit in `T`.
    pub fn total(&self) -> Result<T> {
        if self.is_empty() {
            Ok(T::default())
        } else {
            self.sum_leaves(0, self.len - 1)
        }
    }

    /// Overwrites the value at `index` and refreshes every slot covering it.
    ///
    /// The covering sums are computed before anything is written, so a failed update changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IndexOutOfBounds`] if `index >= len`, or [`IndexError::SumOverflow`]
    /// if a covering sum would not fit in `T`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn update(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;

        let mut slot = self.len + index;
        let mut current = value;
        let mut pending: SmallVec<[(usize, T); 32]> = SmallVec::new();
        pending.push((slot, value));
        while slot > 1 {
            let sibling = self.tree[slot ^ 1];
            current = if slot % 2 == 0 { add(current, sibling)? } else { add(sibling, current)? };
            slot /= 2;
            pending.push((slot, current));
        }

        for (slot, sum) in pending {
            self.tree[slot] = sum;
        }
        debug!(index, "updated range-sum slot");
        Ok(())
    }

    /// Sum of the elements in `left..=right`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidRange`] unless `left <= right < len`, or
    /// [`IndexError::SumOverflow`] if the sum does not fit in `T`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn query(&self, left: usize, right: usize) -> Result<T> {
        if left > right || right >= self.len {
            return Err(IndexError::InvalidRange {
                left,
                right,
                len: self.len,
            });
        }
        self.sum_leaves(left, right)
    }

    /// Collapses two leaf pointers toward each other one level at a time. A left pointer sitting on
    /// a right child (odd slot) is counted and stepped inward; likewise a right pointer on a left
    /// child (even slot).
    fn sum_leaves(&self, left: usize, right: usize) -> Result<T> {
        let mut sum = T::default();
        let mut l = self.len + left;
        let mut r = self.len + right;

        while l <= r {
            if l % 2 == 1 {
                sum = add(sum, self.tree[l])?;
                l += 1;
            }
            if r % 2 == 0 {
                sum = add(sum, self.tree[r])?;
                r -= 1;
            }
            l /= 2;
            r /= 2;
        }

        Ok(sum)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(IndexError::IndexOutOfBounds { index, len: self.len })
        }
    }
}

impl<T: Summand> TryFrom<Vec<T>> for RangeSumArray<T> {
    type Error = IndexError;

    fn try_from(values: Vec<T>) -> Result<Self> {
        Self::new(&values)
    }
}

fn add<T: Summand>(lhs: T, rhs: T) -> Result<T> {
    lhs.checked_sum(rhs).ok_or(IndexError::SumOverflow)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        Update(usize, i64),
        Query(usize, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            1 => (any::<usize>(), -1000i64..1000).prop_map(|(i, v)| Op::Update(i, v)),
            2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Query(a, b)),
        ]
    }

    #[test]
    fn single_element() {
        let mut array = RangeSumArray::new(&[4u32]).unwrap();
        assert_eq!(array.query(0, 0), Ok(4));
        array.update(0, 9).unwrap();
        assert_eq!(array.total(), Ok(9));
    }

    #[test]
    fn empty_array_rejects_everything() {
        let mut array: RangeSumArray<i32> = RangeSumArray::new(&[]).unwrap();
        assert_eq!(array.total(), Ok(0));
        assert_eq!(array.query(0, 0), Err(IndexError::InvalidRange { left: 0, right: 0, len: 0 }));
        assert_eq!(array.update(0, 1), Err(IndexError::IndexOutOfBounds { index: 0, len: 0 }));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let array = RangeSumArray::new(&[1, 2, 3]).unwrap();
        assert_eq!(array.query(2, 1), Err(IndexError::InvalidRange { left: 2, right: 1, len: 3 }));
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut array = RangeSumArray::new(&[1, 2, 3]).unwrap();
        let before = array.clone();
        assert!(array.update(3, 100).is_err());
        assert_eq!(array, before);
    }

    #[test]
    fn overflowing_build_is_rejected() {
        assert_eq!(RangeSumArray::new(&[i64::MAX, 1]), Err(IndexError::SumOverflow));
        assert_eq!(RangeSumArray::new(&[u8::MAX, 0, 1]), Err(IndexError::SumOverflow));
        assert_eq!(RangeSumArray::new(&[f64::MAX, f64::MAX]), Err(IndexError::SumOverflow));
    }

    #[test]
    fn overflowing_update_changes_nothing() {
        let mut array = RangeSumArray::new(&[1i64, 2, 3]).unwrap();
        let before = array.clone();
        assert_eq!(array.update(0, i64::MAX), Err(IndexError::SumOverflow));
        assert_eq!(array, before);
        assert_eq!(array.total(), Ok(6));
    }

    #[test]
    fn overflowing_query_is_rejected() {
        // Every stored sum fits, but the window `1..=2` does not.
        let array = RangeSumArray::new(&[-1i64, i64::MAX, 1, -1]).unwrap();
        assert_eq!(array.query(1, 2), Err(IndexError::SumOverflow));
        assert_eq!(array.query(0, 1), Ok(i64::MAX - 1));
        assert_eq!(array.get(1), Ok(i64::MAX));
    }

    proptest! {
        #[test]
        fn matches_brute_force(
            initial in prop::collection::vec(-1000i64..1000, 1..100),
            ops in prop::collection::vec(op_strategy(), 0..200),
        ) {
            let mut array = RangeSumArray::new(&initial).unwrap();
            let mut model = initial.clone();
            let n = model.len();

            for op in ops {
                match op {
                    Op::Update(i, v) => {
                        let i = i % n;
                        array.update(i, v).unwrap();
                        model[i] = v;
                    }
                    Op::Query(a, b) => {
                        let (l, r) = ((a % n).min(b % n), (a % n).max(b % n));
                        prop_assert_eq!(array.query(l, r).unwrap(), model[l..=r].iter().sum::<i64>());
                    }
                }
            }

            prop_assert_eq!(array.values(), &model[..]);
            prop_assert_eq!(array.total(), Ok(model.iter().sum::<i64>()));
        }

        #[test]
        fn repeated_update_is_idempotent(
            initial in prop::collection::vec(-1000i64..1000, 1..64),
            index in any::<usize>(),
            value in -1000i64..1000,
        ) {
            let index = index % initial.len();
            let mut once = RangeSumArray::new(&initial).unwrap();
            once.update(index, value).unwrap();
            let mut twice = once.clone();
            twice.update(index, value).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
