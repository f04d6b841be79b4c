//! Rank index over per-entity average ratings.
//!
//! [`RatingIndex`] keeps a running `(sum, count)` for every entity and mirrors each entity's
//! current average into an [`AvlMap`] keyed by `(average, identity)`, so best- and worst-rated
//! entities come out of an ordered traversal.

use core::cmp::Ordering;
use core::fmt;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::avl_map::AvlMap;
use crate::error::{IndexError, Result};

/// A finite rating or average with a total order.
///
/// NaN and infinities are rejected on construction and `-0.0` is stored as `0.0`, which makes
/// the `Eq`/`Ord` implementations agree with ordinary numeric comparison.
///
/// # Examples
///
/// ```
/// use catalog_index::Score;
///
/// let score = Score::new(7.5).unwrap();
/// assert_eq!(score.get(), 7.5);
/// assert!(Score::new(f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Score(f64);

impl Score {
    /// Wraps `value`, rejecting NaN and infinities.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NonFiniteScore`] if `value` is not finite.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() {
            // Folds -0.0 into 0.0.
            Ok(Self(value + 0.0))
        } else {
            Err(IndexError::NonFiniteScore(value))
        }
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Score {
    type Error = IndexError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Composite rank key: ordered by score, then by identity, so equal scores still sort totally.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RatingKey {
    /// The entity's average at the time the key was inserted.
    pub score: Score,
    /// The entity's name.
    pub identity: String,
}

impl RatingKey {
    /// Builds a key from its two components.
    pub fn new(score: Score, identity: impl Into<String>) -> Self {
        Self {
            score,
            identity: identity.into(),
        }
    }
}

/// Running total of the ratings received by one entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    /// Sum of every rating received.
    pub sum: f64,
    /// Number of ratings received.
    pub count: u64,
}

impl Accumulator {
    /// Returns the accumulator after one more rating of `value`.
    #[must_use]
    pub fn record(self, value: f64) -> Self {
        Self {
            sum: self.sum + value,
            count: self.count + 1,
        }
    }

    /// `sum / count`, or `None` before the first rating.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// What happens to an entity's previous rank entry when its average changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Remove the previous `(average, identity)` entry before inserting the new one, so each
    /// entity has exactly one live entry.
    #[default]
    Relocate,
    /// Leave earlier entries in the tree. Traversals then show every average an entity has had,
    /// which doubles as a rating history.
    Retain,
}

/// How [`RatingIndex::with_rating`] compares averages against its target.
///
/// Deserialization rejects a tolerance that is negative or NaN. Prefer
/// [`ScoreMatch::tolerance`] over building the variant by hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "UncheckedScoreMatch")]
pub enum ScoreMatch {
    /// Bitwise-exact floating point equality. Averages that are mathematically equal but were
    /// reached through different rounding will not match.
    #[default]
    Exact,
    /// `|average - target| <= epsilon`.
    Tolerance {
        /// Largest accepted absolute difference.
        epsilon: f64,
    },
}

impl ScoreMatch {
    /// A tolerant match accepting averages within `epsilon` of the target.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidTolerance`] if `epsilon` is NaN or negative. An infinite
    /// `epsilon` is accepted and matches every average.
    pub fn tolerance(epsilon: f64) -> Result<Self> {
        if epsilon >= 0.0 {
            Ok(ScoreMatch::Tolerance { epsilon })
        } else {
            Err(IndexError::InvalidTolerance(epsilon))
        }
    }

    /// Returns `true` if `score` counts as equal to `target`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn matches(self, score: f64, target: f64) -> bool {
        match self {
            ScoreMatch::Exact => score == target,
            ScoreMatch::Tolerance { epsilon } => (score - target).abs() <= epsilon,
        }
    }
}

/// Wire shape of [`ScoreMatch`] before the tolerance is checked.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum UncheckedScoreMatch {
    Exact,
    Tolerance { epsilon: f64 },
}

impl TryFrom<UncheckedScoreMatch> for ScoreMatch {
    type Error = IndexError;

    fn try_from(unchecked: UncheckedScoreMatch) -> Result<Self> {
        match unchecked {
            UncheckedScoreMatch::Exact => Ok(ScoreMatch::Exact),
            UncheckedScoreMatch::Tolerance { epsilon } => ScoreMatch::tolerance(epsilon),
        }
    }
}

/// Configuration for a [`RatingIndex`].
///
/// Loadable from JSON; missing fields take their defaults:
///
/// ```
/// use catalog_index::{RatingIndexConfig, ScoreMatch, StalePolicy};
///
/// let config: RatingIndexConfig =
///     serde_json::from_str(r#"{ "score_match": { "tolerance": { "epsilon": 0.01 } } }"#).unwrap();
/// assert_eq!(config.stale_entries, StalePolicy::Relocate);
/// assert_eq!(config.score_match, ScoreMatch::Tolerance { epsilon: 0.01 });
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingIndexConfig {
    /// Handling of superseded rank entries.
    pub stale_entries: StalePolicy,
    /// Comparison used by [`RatingIndex::with_rating`].
    pub score_match: ScoreMatch,
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    accumulator: Accumulator,
    score: Score,
}

/// Ranks entities by their average rating.
///
/// Entities are created implicitly by their first rating. There is no removal.
///
/// # Examples
///
/// ```
/// use catalog_index::RatingIndex;
///
/// let mut index = RatingIndex::new();
/// index.add_rating("Inception", 8.0).unwrap();
/// index.add_rating("Inception", 6.0).unwrap();
/// index.add_rating("Heat", 9.0).unwrap();
///
/// let best: Vec<_> = index.descending().collect();
/// assert_eq!(best, [("Heat", 9.0), ("Inception", 7.0)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RatingIndex {
    tree: AvlMap<RatingKey, String>,
    entities: HashMap<String, Entity>,
    config: RatingIndexConfig,
}

impl RatingIndex {
    /// Creates an empty index with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with the given configuration.
    #[must_use]
    pub fn with_config(config: RatingIndexConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &RatingIndexConfig {
        &self.config
    }

    /// Records one rating for `identity` and re-ranks it. Returns the entity's new average.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NonFiniteScore`] if `value` is not finite or the running sum
    /// overflows. The index is left unchanged in that case.
    ///
    /// # Complexity
    ///
    /// O(log n), plus one extra removal under [`StalePolicy::Relocate`].
    pub fn add_rating(&mut self, identity: &str, value: f64) -> Result<Score> {
        Score::new(value)?;
        let previous = self.entities.get(identity).copied();
        let accumulator = previous.map_or_else(Accumulator::default, |e| e.accumulator).record(value);
        let average = Score::new(accumulator.average().unwrap_or(f64::NAN))?;

        if let Some(previous) = previous
            && self.config.stale_entries == StalePolicy::Relocate
            && previous.score != average
        {
            self.tree.remove(&RatingKey::new(previous.score, identity));
            debug!(identity, from = %previous.score, to = %average, "relocated rank entry");
        }
        self.tree.insert(RatingKey::new(average, identity), identity.to_owned());
        self.entities.insert(identity.to_owned(), Entity { accumulator, score: average });

        debug!(identity, value, %average, count = accumulator.count, "recorded rating");
        Ok(average)
    }

    /// Every rank entry as `(identity, average)`, lowest average first.
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = (&str, f64)> + ExactSizeIterator {
        self.tree.in_order().map(|(key, identity)| (identity.as_str(), key.score.get()))
    }

    /// Every rank entry as `(identity, average)`, highest average first.
    pub fn descending(&self) -> impl DoubleEndedIterator<Item = (&str, f64)> + ExactSizeIterator {
        self.ascending().rev()
    }

    /// The `n` highest-ranked entries.
    pub fn best(&self, n: usize) -> impl Iterator<Item = (&str, f64)> {
        self.descending().take(n)
    }

    /// The `n` lowest-ranked entries.
    pub fn worst(&self, n: usize) -> impl Iterator<Item = (&str, f64)> {
        self.ascending().take(n)
    }

    /// Identities whose rank entry matches `target` under the configured [`ScoreMatch`], in
    /// ascending traversal order (ascending identity among equal averages).
    ///
    /// # Complexity
    ///
    /// O(n): a full in-order scan.
    #[must_use]
    pub fn with_rating(&self, target: f64) -> Vec<&str> {
        self.tree
            .filter_by_score(target, self.config.score_match)
            .map(|(_, identity)| identity.as_str())
            .collect()
    }

    /// The running total for `identity`, if it has been rated.
    #[must_use]
    pub fn accumulator(&self, identity: &str) -> Option<Accumulator> {
        self.entities.get(identity).map(|e| e.accumulator)
    }

    /// The current average for `identity`, if it has been rated.
    #[must_use]
    pub fn average(&self, identity: &str) -> Option<f64> {
        self.entities.get(identity).map(|e| e.score.get())
    }

    /// Number of rank entries, including stale ones under [`StalePolicy::Retain`].
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if nothing has been rated yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of distinct rated entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl<V> AvlMap<RatingKey, V> {
    /// In-order scan keeping the entries whose score matches `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_index::{AvlMap, RatingKey, Score, ScoreMatch};
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(RatingKey::new(Score::new(5.0).unwrap(), "B"), ());
    /// map.insert(RatingKey::new(Score::new(7.0).unwrap(), "C"), ());
    /// map.insert(RatingKey::new(Score::new(5.0).unwrap(), "A"), ());
    ///
    /// let names: Vec<_> = map.filter_by_score(5.0, ScoreMatch::Exact).map(|(k, _)| k.identity.as_str()).collect();
    /// assert_eq!(names, ["A", "B"]);
    /// ```
    pub fn filter_by_score(&self, target: f64, mode: ScoreMatch) -> impl Iterator<Item = (&RatingKey, &V)> {
        self.in_order().filter(move |(key, _)| mode.matches(key.score.get(), target))
    }
}
