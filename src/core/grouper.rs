// File: src/core/grouper.rs
use crate::core::encoder::FeatureEncoder;
use crate::core::types::{CharSet, WordId};
use crate::core::vocabulary::Vocabulary;
use crate::error::Result;
use std::collections::BTreeMap;

/// All vocabulary words spelled with exactly the same set of characters.
/// One bucket is one training example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnagramBucket {
    pub key: CharSet,
    /// Member word ids, ascending.
    pub words: Vec<WordId>,
}

impl AnagramBucket {
    /// Encoded (input, target) pair; the target is multi-hot over every member.
    pub fn encode(&self, encoder: &FeatureEncoder<'_>) -> Result<(Vec<f32>, Vec<f32>)> {
        Ok((encoder.vectorize_input(&self.key), encoder.vectorize_targets(&self.words)?))
    }
}

/// Partitions the vocabulary by character set. Buckets come out ordered
/// by key, so the batch layout is reproducible across runs.
pub fn group_anagrams(vocab: &Vocabulary) -> Vec<AnagramBucket> {
    let mut sets: BTreeMap<CharSet, Vec<WordId>> = BTreeMap::new();
    for (id, word) in vocab.words().enumerate() {
        sets.entry(CharSet::from_word(word)).or_default().push(id);
    }
    tracing::debug!("Grouped {} words into {} anagram buckets", vocab.word_count(), sets.len());
    sets.into_iter().map(|(key, words)| AnagramBucket { key, words }).collect()
}
