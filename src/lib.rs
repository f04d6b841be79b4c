//! In-memory indexes for a catalog of named entities.
//!
//! This crate provides four independent index structures over the same kind of data:
//!
//! - [`RatingIndex`] - ranks entities by average rating, on top of the balanced [`AvlMap`]
//! - [`RangeSumArray`] - O(log n) point update and inclusive range-sum query over a fixed array
//! - [`PrefixIndex`] - lowercase alphabetic trie for autocomplete
//! - [`AdjacencyIndex`] - directed adjacency lists with BFS and DFS
//!
//! # Example
//!
//! ```
//! use catalog_index::{RangeSumArray, RatingIndex};
//!
//! let mut ratings = RatingIndex::new();
//! ratings.add_rating("Inception", 8.0).unwrap();
//! ratings.add_rating("Inception", 6.0).unwrap();
//! ratings.add_rating("Alien", 7.0).unwrap();
//!
//! // Ties on the average are broken by name.
//! let ranked: Vec<_> = ratings.ascending().collect();
//! assert_eq!(ranked, [("Alien", 7.0), ("Inception", 7.0)]);
//! assert_eq!(ratings.with_rating(7.0), ["Alien", "Inception"]);
//!
//! let mut box_office = RangeSumArray::new(&[1, 3, 5, 7, 9, 11]).unwrap();
//! assert_eq!(box_office.query(1, 3), Ok(15));
//! box_office.update(1, 10).unwrap();
//! assert_eq!(box_office.query(1, 3), Ok(22));
//! ```
//!
//! # Concurrency
//!
//! Nothing here is internally synchronized. Mutations to one index must be serialized by the
//! caller; shared reads may run concurrently with each other. Indexes share no state, so
//! different indexes can be used from different threads freely.
//!
//! # Logging
//!
//! Rating updates, range-sum updates, trie inserts and new graph edges emit `tracing` events at
//! `debug` level. Words skipped by `PrefixIndex::extend` are reported at `warn`, and tree rotations
//! at `trace`. No subscriber is installed by the library.

#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod raw;

pub mod adjacency_index;
pub mod avl_map;
pub mod error;
pub mod prefix_index;
pub mod range_sum;
pub mod rating_index;

pub use adjacency_index::AdjacencyIndex;
pub use avl_map::AvlMap;
pub use error::{IndexError, Result};
pub use prefix_index::PrefixIndex;
pub use range_sum::{RangeSumArray, Summand};
pub use rating_index::{Accumulator, RatingIndex, RatingIndexConfig, RatingKey, Score, ScoreMatch, StalePolicy};
