// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense index of a vocabulary word, in `[0, word_count)`.
pub type WordId = usize;

/// Dense index of an alphabet character, in `[0, char_count)`.
pub type CharId = usize;

/// The canonical form of an unordered set of characters.
/// Characters are sorted and de-duplicated, so two anagrams (and two words
/// differing only in repeated letters) produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharSet(Vec<char>);

impl CharSet {
    pub fn from_word(word: &str) -> Self {
        let mut chars: Vec<char> = word.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        Self(chars)
    }

    pub fn chars(&self) -> &[char] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anagrams_share_a_key() {
        assert_eq!(CharSet::from_word("listen"), CharSet::from_word("silent"));
    }

    #[test]
    fn test_repeated_letters_collapse() {
        let set = CharSet::from_word("banana");
        assert_eq!(set.chars(), &['a', 'b', 'n']);
        assert_eq!(set, CharSet::from_word("nab"));
        assert_eq!(set.to_string(), "abn");
    }

    #[test]
    fn test_empty_word() {
        assert!(CharSet::from_word("").is_empty());
    }
}
