//! Lowercase alphabetic trie for autocomplete.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::{IndexError, Result};
use crate::raw::{Arena, Handle};

const ALPHABET: usize = 26;

/// Letter offsets (`0` for `a`) of a normalised word.
type Letters = SmallVec<[u8; 32]>;

#[derive(Clone, Debug, Default)]
struct TrieNode {
    children: [Option<Handle>; ALPHABET],
    terminal: bool,
}

/// A 26-way trie over the letters `a` to `z`.
///
/// Uppercase ASCII letters are folded to lowercase on the way in. Anything else is rejected, so
/// every stored word and every suggestion is lowercase ASCII.
///
/// # Examples
///
/// ```
/// use catalog_index::PrefixIndex;
///
/// let mut titles = PrefixIndex::new();
/// titles.bulk_insert(["heat", "her", "hereditary", "alien"]).unwrap();
///
/// assert_eq!(titles.suggestions("he"), ["heat", "her", "hereditary"]);
/// assert!(titles.suggestions("z").is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct PrefixIndex {
    nodes: Arena<TrieNode>,
    root: Handle,
    words: usize,
}

impl PrefixIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(TrieNode::default());
        Self { nodes, root, words: 0 }
    }

    /// Number of distinct words stored.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.words
    }

    /// Returns `true` if no word has been stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Stores `word`. Returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyWord`] or [`IndexError::InvalidCharacter`] if `word` is empty or
    /// contains anything but ASCII letters.
    pub fn insert(&mut self, word: &str) -> Result<bool> {
        let letters = normalize(word)?;
        let added = self.insert_letters(&letters);
        debug!(word, added, words = self.words, "inserted word");
        Ok(added)
    }

    /// Stores every word in `words`, returning how many were new.
    ///
    /// Every word is validated before any is inserted, so an error leaves the index unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](PrefixIndex::insert), for the first offending word.
    pub fn bulk_insert<I, S>(&mut self, words: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = words.into_iter().map(|word| normalize(word.as_ref())).collect::<Result<Vec<_>>>()?;
        let added = batch.iter().filter(|letters| self.insert_letters(letters)).count();
        debug!(offered = batch.len(), added, "bulk inserted words");
        Ok(added)
    }

    /// Returns `true` if `word` was stored. Never fails; unsupported input is simply absent.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        normalize(word)
            .ok()
            .and_then(|letters| self.find(&letters))
            .is_some_and(|handle| self.nodes.get(handle).terminal)
    }

    /// Every stored word starting with `prefix`, depth-first with children in ascending letter
    /// order.
    ///
    /// A prefix that is itself a stored word comes first. An empty prefix lists the whole index.
    /// Unknown or unsupported prefixes give an empty result.
    #[must_use]
    pub fn suggestions(&self, prefix: &str) -> Vec<String> {
        let letters = if prefix.is_empty() {
            Letters::new()
        } else {
            match normalize(prefix) {
                Ok(letters) => letters,
                Err(_) => return Vec::new(),
            }
        };
        let Some(start) = self.find(&letters) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut stack: Vec<(Handle, String)> = vec![(start, spell(&letters))];
        while let Some((handle, word)) = stack.pop() {
            let node = self.nodes.get(handle);
            // Pushed in reverse so that `a` is popped first.
            for (letter, child) in node.children.iter().enumerate().rev() {
                if let Some(child) = *child {
                    let mut next = word.clone();
                    next.push(letter_char(letter));
                    stack.push((child, next));
                }
            }
            if node.terminal {
                found.push(word);
            }
        }
        found
    }

    fn find(&self, letters: &[u8]) -> Option<Handle> {
        letters
            .iter()
            .try_fold(self.root, |handle, &letter| self.nodes.get(handle).children[usize::from(letter)])
    }

    fn insert_letters(&mut self, letters: &[u8]) -> bool {
        let mut current = self.root;
        for &letter in letters {
            let slot = usize::from(letter);
            current = match self.nodes.get(current).children[slot] {
                Some(child) => child,
                None => {
                    let child = self.nodes.alloc(TrieNode::default());
                    self.nodes.get_mut(current).children[slot] = Some(child);
                    child
                }
            };
        }

        let node = self.nodes.get_mut(current);
        let added = !node.terminal;
        node.terminal = true;
        if added {
            self.words += 1;
        }
        added
    }
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>> Extend<S> for PrefixIndex {
    /// Inserts every valid word. Invalid ones are skipped with a `warn` event; use
    /// [`bulk_insert`](PrefixIndex::bulk_insert) to get the error instead.
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        let mut skipped = 0usize;
        for word in iter {
            match normalize(word.as_ref()) {
                Ok(letters) => {
                    self.insert_letters(&letters);
                }
                Err(error) => {
                    skipped += 1;
                    warn!(%error, "skipped word");
                }
            }
        }
        if skipped > 0 {
            debug!(skipped, words = self.words, "extended with invalid words skipped");
        }
    }
}

fn normalize(word: &str) -> Result<Letters> {
    if word.is_empty() {
        return Err(IndexError::EmptyWord);
    }
    word.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                Ok(c.to_ascii_lowercase() as u8 - b'a')
            } else {
                Err(IndexError::InvalidCharacter {
                    word: word.to_owned(),
                    character: c,
                })
            }
        })
        .collect()
}

fn letter_char(letter: usize) -> char {
    char::from(b'a' + u8::try_from(letter).expect("`letter_char()` - letter offset exceeds alphabet!"))
}

fn spell(letters: &[u8]) -> String {
    letters.iter().map(|&letter| char::from(b'a' + letter)).collect()
}
