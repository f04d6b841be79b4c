//! Error types shared by every index in the crate.

use thiserror::Error;

/// Errors reported by the catalog indexes.
///
/// Every variant is an invalid-argument condition: the call was rejected before any state was
/// changed. Lookups that simply find nothing return empty results instead of an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// A position outside `[0, len)` was passed to a range-sum array.
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The rejected position.
        index: usize,
        /// Number of elements in the array.
        len: usize,
    },

    /// An inclusive range that is reversed or extends past the end of the array.
    #[error("range {left}..={right} is invalid for length {len}")]
    InvalidRange {
        /// Requested left bound.
        left: usize,
        /// Requested right bound.
        right: usize,
        /// Number of elements in the array.
        len: usize,
    },

    /// A rating or average that cannot be ordered (NaN or infinite).
    #[error("score {0} is not a finite number")]
    NonFiniteScore(f64),

    /// A word containing something other than ASCII letters.
    #[error("word {word:?} contains unsupported character {character:?}")]
    InvalidCharacter {
        /// The rejected word.
        word: String,
        /// The first offending character.
        character: char,
    },

    /// An empty word was offered to the prefix index.
    #[error("empty words cannot be indexed")]
    EmptyWord,

    /// A range sum that does not fit in the element type.
    #[error("range sum does not fit in the element type")]
    SumOverflow,

    /// A match tolerance that is negative or NaN.
    #[error("tolerance {0} must be a non-negative number")]
    InvalidTolerance(f64),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
