// File: src/core/engine.rs
use crate::core::encoder::FeatureEncoder;
use crate::core::grouper::group_anagrams;
use crate::core::types::CharSet;
use crate::core::vocabulary::Vocabulary;
use crate::error::{Result, SpellerError};
use crate::network::{DenseNetwork, Predictor};
use crate::persistence;
use crate::training::{BatchTrainer, TrainConfig, TrainOutcome, TrainingObserver};
use std::path::Path;

/// The most likely word for a bag of letters.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub word: String,
    /// Activation of the winning output unit.
    pub confidence: f32,
}

/// A vocabulary paired with the network trained on it.
/// The predictor is only mutated while training; afterwards it is query-only.
pub struct Speller<P> {
    vocab: Vocabulary,
    predictor: P,
}

impl Speller<DenseNetwork> {
    /// Groups the vocabulary into anagram buckets, builds a fresh dense
    /// layer sized to the alphabet and vocabulary, and trains it.
    pub fn train<O: TrainingObserver>(
        vocab: Vocabulary,
        config: &TrainConfig,
        observer: &mut O,
    ) -> Result<(Self, TrainOutcome)> {
        let buckets = group_anagrams(&vocab);
        let mut network = DenseNetwork::new(vocab.char_count(), vocab.word_count(), config.network, config.seed);
        tracing::info!(
            "Created network [{}, {}] for {} anagram sets",
            vocab.char_count(),
            vocab.word_count(),
            buckets.len()
        );

        let outcome = BatchTrainer::new(&vocab, &buckets, config)?.train(&mut network, observer)?;
        Ok((Self::new(vocab, network), outcome))
    }
}

impl<P: Predictor> Speller<P> {
    pub fn new(vocab: Vocabulary, predictor: P) -> Self {
        Self { vocab, predictor }
    }

    /// Loads a previously saved id mapping and network.
    pub fn from_files(ids_path: &Path, network_path: &Path) -> Result<Self> {
        let vocab = persistence::load_vocabulary(ids_path)?;
        let predictor = P::load(network_path)?;
        Ok(Self::new(vocab, predictor))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Treats `query` as a set of letters and returns the best matching word.
    /// Characters the network has never seen are ignored; `None` means no
    /// usable character was left.
    pub fn predict(&self, query: &str) -> Result<Option<Prediction>> {
        let set = CharSet::from_word(&query.to_lowercase());
        let encoder = FeatureEncoder::new(&self.vocab);

        let unknown = encoder.unknown_chars(&set);
        if !unknown.is_empty() {
            tracing::warn!("Ignoring characters not in the alphabet: {:?}", unknown);
        }
        if unknown.len() == set.len() {
            return Ok(None);
        }

        let output = self.predictor.run(&encoder.vectorize_input(&set))?;
        let mut best: Option<(usize, f32)> = None;
        for (id, &activation) in output.iter().enumerate() {
            if best.map_or(true, |(_, max)| activation > max) {
                best = Some((id, activation));
            }
        }

        let Some((id, confidence)) = best else {
            return Ok(None);
        };
        let word = self
            .vocab
            .word(id)
            .ok_or(SpellerError::ShapeMismatch { expected: self.vocab.word_count(), found: output.len() })?;
        Ok(Some(Prediction { word: word.to_string(), confidence }))
    }
}
