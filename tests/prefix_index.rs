use pretty_assertions::assert_eq;
use catalog_index::{IndexError, PrefixIndex};

fn catalog() -> PrefixIndex {
    let mut index = PrefixIndex::new();
    index
        .bulk_insert(["the", "then", "there", "thermal", "theatre", "alien", "aliens", "amelie"])
        .unwrap();
    index
}

#[test]
fn suggestions_are_depth_first_alphabetical() {
    assert_eq!(catalog().suggestions("the"), ["the", "theatre", "then", "there", "thermal"]);
    assert_eq!(catalog().suggestions("ali"), ["alien", "aliens"]);
}

#[test]
fn unmatched_prefix_is_empty() {
    let index = catalog();
    assert!(index.suggestions("xyz").is_empty());
    assert!(index.suggestions("thez").is_empty());
    assert!(index.suggestions("th e").is_empty());
}

#[test]
fn exact_word_without_children_suggests_itself() {
    assert_eq!(catalog().suggestions("amelie"), ["amelie"]);
}

#[test]
fn membership_requires_a_terminal_word() {
    let index = catalog();
    assert!(index.contains("then"));
    assert!(!index.contains("thermals"));
    assert!(!index.contains("ther"));
    assert_eq!(index.len(), 8);
}

#[test]
fn punctuation_is_rejected() {
    let mut index = PrefixIndex::new();
    assert_eq!(
        index.insert("wall-e"),
        Err(IndexError::InvalidCharacter {
            word: "wall-e".to_owned(),
            character: '-',
        })
    );
}
