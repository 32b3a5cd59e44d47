// File: src/training.rs
use crate::core::encoder::FeatureEncoder;
use crate::core::grouper::AnagramBucket;
use crate::core::vocabulary::Vocabulary;
use crate::error::{Result, SpellerError};
use crate::network::dense::NetworkParams;
use crate::network::{Predictor, TrainingBatch};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Knobs of a training run. None of these are part of any file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Upper bound on buckets per mini-batch; the effective size is
    /// `min(batch_size, bucket_count)`.
    pub batch_size: usize,
    /// Extra passes run on a mini-batch whose first pass had bit failures.
    pub polish_passes: usize,
    /// `None` trains until convergence, however long that takes.
    pub max_epochs: Option<usize>,
    pub network: NetworkParams,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            batch_size: 2000,
            polish_passes: 3,
            max_epochs: None,
            network: NetworkParams::default(),
            seed: 0,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> { Err(SpellerError::InvalidConfig(msg.to_string())) };
        if self.batch_size == 0 {
            return invalid("batch size must be at least 1");
        }
        if self.max_epochs == Some(0) {
            return invalid("max epochs must be at least 1");
        }
        let NetworkParams { learning_rate, steepness, bit_fail_limit } = self.network;
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return invalid("learning rate must be a positive number");
        }
        if !(steepness.is_finite() && steepness > 0.0) {
            return invalid("steepness must be a positive number");
        }
        if !(bit_fail_limit > 0.0 && bit_fail_limit <= 1.0) {
            return invalid("bit fail limit must lie in (0, 1]");
        }
        Ok(())
    }
}

/// How the epoch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    /// An epoch finished with zero accumulated bit fail.
    Converged { epochs: usize },
    /// `max_epochs` ran out first.
    EpochLimitReached { epochs: usize, total_bit_fail: usize },
}

impl TrainOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, TrainOutcome::Converged { .. })
    }

    pub fn epochs(&self) -> usize {
        match *self {
            TrainOutcome::Converged { epochs } | TrainOutcome::EpochLimitReached { epochs, .. } => epochs,
        }
    }
}

/// What happened to one mini-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// 1-based.
    pub index: usize,
    pub total: usize,
    /// Bit fail of the first pass.
    pub bit_fail: usize,
    /// Bit fail after the polish passes, if they ran.
    pub polished_bit_fail: Option<usize>,
}

/// Progress hooks. The library never prints; the binary turns these into
/// console lines.
pub trait TrainingObserver {
    fn epoch_started(&mut self, _epoch: usize) {}
    fn batch_trained(&mut self, _report: &BatchReport) {}
    fn epoch_finished(&mut self, _epoch: usize, _total_bit_fail: usize) {}
}

pub struct NoopObserver;

impl TrainingObserver for NoopObserver {}

/// Full mini-batch windows over `bucket_count` buckets. A trailing window
/// shorter than the batch size is dropped.
pub fn batch_ranges(bucket_count: usize, max_batch_size: usize) -> Vec<Range<usize>> {
    let size = max_batch_size.min(bucket_count);
    if size == 0 {
        return Vec::new();
    }
    (0..bucket_count / size).map(|i| i * size..(i + 1) * size).collect()
}

/// Drives a [`Predictor`] over the anagram buckets, epoch after epoch,
/// until an epoch accumulates no bit fail.
pub struct BatchTrainer<'a> {
    encoder: FeatureEncoder<'a>,
    buckets: &'a [AnagramBucket],
    config: &'a TrainConfig,
}

impl<'a> BatchTrainer<'a> {
    pub fn new(vocab: &'a Vocabulary, buckets: &'a [AnagramBucket], config: &'a TrainConfig) -> Result<Self> {
        config.validate()?;
        if buckets.is_empty() {
            return Err(SpellerError::EmptyCorpus);
        }
        Ok(Self { encoder: FeatureEncoder::new(vocab), buckets, config })
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size.min(self.buckets.len())
    }

    pub fn batches(&self) -> Vec<Range<usize>> {
        batch_ranges(self.buckets.len(), self.config.batch_size)
    }

    pub fn build_batch(&self, range: Range<usize>) -> Result<TrainingBatch> {
        let mut batch = TrainingBatch::with_capacity(range.len());
        for bucket in &self.buckets[range] {
            let (input, target) = bucket.encode(&self.encoder)?;
            batch.push(input, target)?;
        }
        Ok(batch)
    }

    pub fn train<P, O>(&self, predictor: &mut P, observer: &mut O) -> Result<TrainOutcome>
    where
        P: Predictor,
        O: TrainingObserver,
    {
        let ranges = self.batches();
        tracing::info!(
            "Training on {} buckets in {} mini-batches of {}",
            self.buckets.len(),
            ranges.len(),
            self.batch_size()
        );

        let mut epoch = 1;
        loop {
            observer.epoch_started(epoch);
            let total_bit_fail = self.run_epoch(predictor, observer, &ranges)?;
            observer.epoch_finished(epoch, total_bit_fail);
            tracing::debug!("Epoch {} finished with bit fail {}", epoch, total_bit_fail);

            if total_bit_fail == 0 {
                tracing::info!("Converged after {} epochs", epoch);
                return Ok(TrainOutcome::Converged { epochs: epoch });
            }
            if self.config.max_epochs.is_some_and(|max| epoch >= max) {
                tracing::warn!("Stopped after {} epochs without converging (bit fail {})", epoch, total_bit_fail);
                return Ok(TrainOutcome::EpochLimitReached { epochs: epoch, total_bit_fail });
            }
            epoch += 1;
        }
    }

    fn run_epoch<P, O>(&self, predictor: &mut P, observer: &mut O, ranges: &[Range<usize>]) -> Result<usize>
    where
        P: Predictor,
        O: TrainingObserver,
    {
        let mut total_bit_fail = 0;
        for (i, range) in ranges.iter().enumerate() {
            let batch = self.build_batch(range.clone())?;
            let bit_fail = predictor.train(&batch, 1)?;

            let polished_bit_fail = if bit_fail == 0 {
                None
            } else {
                total_bit_fail += bit_fail;
                predictor.train(&batch, self.config.polish_passes)?;
                Some(predictor.bit_fail())
            };

            observer.batch_trained(&BatchReport {
                index: i + 1,
                total: ranges.len(),
                bit_fail,
                polished_bit_fail,
            });
        }
        Ok(total_bit_fail)
    }
}
