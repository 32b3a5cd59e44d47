// File: src/network/mod.rs
pub mod dense;

pub use dense::DenseNetwork;

use crate::error::{Result, SpellerError};
use std::path::Path;

/// One mini-batch of encoded examples, loaded as a single training set.
#[derive(Debug, Clone, Default)]
pub struct TrainingBatch {
    inputs: Vec<Vec<f32>>,
    targets: Vec<Vec<f32>>,
}

impl TrainingBatch {
    pub fn with_capacity(n: usize) -> Self {
        Self { inputs: Vec::with_capacity(n), targets: Vec::with_capacity(n) }
    }

    /// Appends one example. Every example in a batch must share the widths
    /// of the first one pushed.
    pub fn push(&mut self, input: Vec<f32>, target: Vec<f32>) -> Result<()> {
        if let (Some(first_in), Some(first_out)) = (self.inputs.first(), self.targets.first()) {
            if input.len() != first_in.len() {
                return Err(SpellerError::ShapeMismatch { expected: first_in.len(), found: input.len() });
            }
            if target.len() != first_out.len() {
                return Err(SpellerError::ShapeMismatch { expected: first_out.len(), found: target.len() });
            }
        }
        self.inputs.push(input);
        self.targets.push(target);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn examples(&self) -> impl Iterator<Item = (&[f32], &[f32])> {
        self.inputs.iter().map(Vec::as_slice).zip(self.targets.iter().map(Vec::as_slice))
    }
}

/// The capability the trainer and the query loop need from a network.
/// Nothing outside `network` depends on a concrete implementation.
pub trait Predictor {
    /// Runs up to `max_passes` passes over `batch`, stopping early after a
    /// pass with zero bit fail. Returns the bit fail of the last pass.
    fn train(&mut self, batch: &TrainingBatch, max_passes: usize) -> Result<usize>;

    /// Bit fail measured during the most recent training pass.
    fn bit_fail(&self) -> usize;

    /// Forward pass.
    fn run(&self, input: &[f32]) -> Result<Vec<f32>>;

    fn save(&self, path: &Path) -> Result<()>;

    fn load(path: &Path) -> Result<Self>
    where
        Self: Sized;
}
