// File: src/core/vocabulary.rs
use crate::core::types::{CharId, WordId};
use crate::error::{Result, SpellerError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Bidirectional word <-> id and char -> id mappings built from a corpus.
///
/// Ids are assigned in lexicographic order of the distinct words (and
/// characters), so indexing the same corpus twice yields identical ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    word_to_id: HashMap<String, WordId>,
    id_to_word: Vec<String>,
    char_to_id: HashMap<char, CharId>,
}

/// The persisted shape of a [`Vocabulary`]. Maps are key-ordered so the
/// JSON sidecar is stable and diffable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRecord {
    pub word_to_id: BTreeMap<String, WordId>,
    pub id_to_word: BTreeMap<WordId, String>,
    pub char_to_id: BTreeMap<char, CharId>,
}

impl Vocabulary {
    /// Lowercases the corpus, splits it on whitespace and indexes the
    /// distinct tokens. The alphabet covers every character of every word,
    /// plus the space that joins them when there is more than one word.
    pub fn from_corpus(text: &str) -> Result<Self> {
        let lowered = text.to_lowercase();
        let words: BTreeSet<&str> = lowered.split_whitespace().collect();
        if words.is_empty() {
            return Err(SpellerError::EmptyCorpus);
        }

        let mut alphabet: BTreeSet<char> = words.iter().flat_map(|w| w.chars()).collect();
        if words.len() > 1 {
            alphabet.insert(' ');
        }

        let id_to_word: Vec<String> = words.into_iter().map(str::to_string).collect();
        let word_to_id = id_to_word
            .iter()
            .enumerate()
            .map(|(id, word)| (word.clone(), id))
            .collect();
        let char_to_id = alphabet.into_iter().enumerate().map(|(id, c)| (c, id)).collect();

        Ok(Self { word_to_id, id_to_word, char_to_id })
    }

    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.word_to_id.get(word).copied()
    }

    pub fn word(&self, id: WordId) -> Option<&str> {
        self.id_to_word.get(id).map(String::as_str)
    }

    pub fn char_id(&self, c: char) -> Option<CharId> {
        self.char_to_id.get(&c).copied()
    }

    /// Output vector width.
    pub fn word_count(&self) -> usize {
        self.id_to_word.len()
    }

    /// Input vector width.
    pub fn char_count(&self) -> usize {
        self.char_to_id.len()
    }

    /// Words in id order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.id_to_word.iter().map(String::as_str)
    }

    pub fn to_record(&self) -> VocabularyRecord {
        VocabularyRecord {
            word_to_id: self.word_to_id.iter().map(|(w, &id)| (w.clone(), id)).collect(),
            id_to_word: self.id_to_word.iter().cloned().enumerate().collect(),
            char_to_id: self.char_to_id.iter().map(|(&c, &id)| (c, id)).collect(),
        }
    }

    /// Rebuilds a vocabulary from its persisted form. The record's ids must
    /// be dense and the two word maps must be exact inverses.
    pub fn from_record(record: VocabularyRecord) -> Result<Self> {
        let word_count = record.id_to_word.len();
        if record.word_to_id.len() != word_count {
            return Err(SpellerError::ShapeMismatch {
                expected: word_count,
                found: record.word_to_id.len(),
            });
        }

        let mut id_to_word = Vec::with_capacity(word_count);
        for (expected_id, (id, word)) in record.id_to_word.into_iter().enumerate() {
            if id != expected_id || record.word_to_id.get(&word) != Some(&id) {
                return Err(SpellerError::UnknownWord(word));
            }
            id_to_word.push(word);
        }

        let char_count = record.char_to_id.len();
        let mut seen = vec![false; char_count];
        for &id in record.char_to_id.values() {
            match seen.get_mut(id) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(SpellerError::ShapeMismatch { expected: char_count, found: id.saturating_add(1) })
                }
            }
        }

        Ok(Self {
            word_to_id: record.word_to_id.into_iter().collect(),
            id_to_word,
            char_to_id: record.char_to_id.into_iter().collect(),
        })
    }
}
