// File: src/core/encoder.rs
use crate::core::types::{CharSet, WordId};
use crate::core::vocabulary::Vocabulary;
use crate::error::{Result, SpellerError};

/// Turns character sets and words into the fixed-width vectors the
/// network consumes. Stateless apart from the borrowed vocabulary.
#[derive(Clone, Copy)]
pub struct FeatureEncoder<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    pub fn input_width(&self) -> usize {
        self.vocab.char_count()
    }

    pub fn output_width(&self) -> usize {
        self.vocab.word_count()
    }

    /// Multi-hot presence vector. Characters outside the alphabet are
    /// skipped; callers that care check with [`Self::unknown_chars`].
    pub fn vectorize_input(&self, set: &CharSet) -> Vec<f32> {
        let mut vec = vec![0.0; self.input_width()];
        for &c in set.chars() {
            if let Some(id) = self.vocab.char_id(c) {
                vec[id] = 1.0;
            }
        }
        vec
    }

    pub fn unknown_chars(&self, set: &CharSet) -> Vec<char> {
        set.chars().iter().copied().filter(|&c| self.vocab.char_id(c).is_none()).collect()
    }

    /// One-hot vector at the word's id.
    pub fn vectorize_output(&self, word: &str) -> Result<Vec<f32>> {
        let id = self
            .vocab
            .word_id(word)
            .ok_or_else(|| SpellerError::UnknownWord(word.to_string()))?;
        let mut vec = vec![0.0; self.output_width()];
        vec[id] = 1.0;
        Ok(vec)
    }

    /// Element-wise maximum of the one-hot vectors of `ids`.
    pub fn vectorize_targets(&self, ids: &[WordId]) -> Result<Vec<f32>> {
        let mut vec = vec![0.0; self.output_width()];
        for &id in ids {
            let slot = vec.get_mut(id).ok_or(SpellerError::ShapeMismatch {
                expected: self.output_width(),
                found: id.saturating_add(1),
            })?;
            *slot = 1.0;
        }
        Ok(vec)
    }
}
