// File: src/network/dense.rs
use crate::error::{Result, SpellerError};
use crate::network::{Predictor, TrainingBatch};
use crate::persistence;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial weights are drawn uniformly from `[-INIT_RANGE, INIT_RANGE]`.
const INIT_RANGE: f32 = 0.1;
/// Activations are clipped to this band before taking the sigmoid derivative,
/// otherwise saturated units would stop learning entirely.
const DERIVATIVE_CLIP: (f32, f32) = (0.01, 0.99);
/// Error-function output for a saturated difference.
const TANH_ERROR_CAP: f32 = 17.0;

/// Clamps the raw neuron sum to `±150 / steepness`, then applies the steepness.
fn scaled_sum(sum: f32, steepness: f32) -> f32 {
    let max_sum = 150.0 / steepness;
    sum.clamp(-max_sum, max_sum) * steepness
}

/// Hyperparameters of the dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub learning_rate: f32,
    pub steepness: f32,
    /// An output unit fails when `|target - output| >= bit_fail_limit`.
    pub bit_fail_limit: f32,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self { learning_rate: 1000.0, steepness: 0.5, bit_fail_limit: 0.35 }
    }
}

/// A single fully connected sigmoid layer `[inputs + bias] -> outputs`,
/// trained incrementally (weights move after every sample).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    inputs: usize,
    outputs: usize,
    params: NetworkParams,
    /// Row-major `[outputs][inputs + 1]`; the last column is the bias.
    weights: Vec<f32>,
    #[serde(skip)]
    last_bit_fail: usize,
}

impl DenseNetwork {
    pub fn new(inputs: usize, outputs: usize, params: NetworkParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let weights = (0..outputs * (inputs + 1))
            .map(|_| rng.gen_range(-INIT_RANGE..=INIT_RANGE))
            .collect();
        Self { inputs, outputs, params, weights, last_bit_fail: 0 }
    }

    pub fn input_width(&self) -> usize {
        self.inputs
    }

    pub fn output_width(&self) -> usize {
        self.outputs
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    fn row(&self, output: usize) -> &[f32] {
        let stride = self.inputs + 1;
        &self.weights[output * stride..(output + 1) * stride]
    }

    fn activate(&self, row: &[f32], active: &[(usize, f32)]) -> f32 {
        let mut sum = row[self.inputs];
        for &(i, x) in active {
            sum += row[i] * x;
        }
        1.0 / (1.0 + (-2.0 * scaled_sum(sum, self.params.steepness)).exp())
    }

    fn check_width(&self, expected: usize, found: usize) -> Result<()> {
        if expected != found {
            return Err(SpellerError::ShapeMismatch { expected, found });
        }
        Ok(())
    }

    /// One incremental pass over the batch. Returns its bit fail, counted
    /// for each sample before that sample's update is applied.
    fn train_pass(&mut self, batch: &TrainingBatch) -> Result<usize> {
        let stride = self.inputs + 1;
        let NetworkParams { learning_rate, steepness, bit_fail_limit } = self.params;
        let mut bit_fail = 0;

        for (input, target) in batch.examples() {
            self.check_width(self.inputs, input.len())?;
            self.check_width(self.outputs, target.len())?;
            let active: Vec<(usize, f32)> =
                input.iter().copied().enumerate().filter(|&(_, x)| x != 0.0).collect();

            for (j, &desired) in target.iter().enumerate() {
                let out = self.activate(self.row(j), &active);
                let diff = desired - out;
                if diff.abs() >= bit_fail_limit {
                    bit_fail += 1;
                }

                let err = if diff < -0.9999999 {
                    -TANH_ERROR_CAP
                } else if diff > 0.9999999 {
                    TANH_ERROR_CAP
                } else {
                    ((1.0 + diff) / (1.0 - diff)).ln()
                };
                let v = out.clamp(DERIVATIVE_CLIP.0, DERIVATIVE_CLIP.1);
                let delta = learning_rate * err * 2.0 * steepness * v * (1.0 - v);

                let row = &mut self.weights[j * stride..(j + 1) * stride];
                for &(i, x) in &active {
                    row[i] += delta * x;
                }
                row[self.inputs] += delta;
            }
        }
        Ok(bit_fail)
    }
}

impl Predictor for DenseNetwork {
    fn train(&mut self, batch: &TrainingBatch, max_passes: usize) -> Result<usize> {
        for _ in 0..max_passes {
            self.last_bit_fail = self.train_pass(batch)?;
            if self.last_bit_fail == 0 {
                break;
            }
        }
        Ok(self.last_bit_fail)
    }

    fn bit_fail(&self) -> usize {
        self.last_bit_fail
    }

    fn run(&self, input: &[f32]) -> Result<Vec<f32>> {
        self.check_width(self.inputs, input.len())?;
        let active: Vec<(usize, f32)> =
            input.iter().copied().enumerate().filter(|&(_, x)| x != 0.0).collect();
        Ok((0..self.outputs).map(|j| self.activate(self.row(j), &active)).collect())
    }

    fn save(&self, path: &Path) -> Result<()> {
        persistence::save_bincode(self, path)
    }

    fn load(path: &Path) -> Result<Self> {
        let net: Self = persistence::load_bincode(path)?;
        if net.weights.len() != net.outputs * (net.inputs + 1) {
            return Err(SpellerError::ShapeMismatch {
                expected: net.outputs * (net.inputs + 1),
                found: net.weights.len(),
            });
        }
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_way_batch() -> TrainingBatch {
        let mut batch = TrainingBatch::with_capacity(2);
        batch.push(vec![1.0, 1.0, 0.0, 0.0], vec![1.0, 0.0, 1.0]).unwrap();
        batch.push(vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 1.0, 0.0]).unwrap();
        batch
    }

    #[test]
    fn test_initial_weights_in_range_and_seeded() {
        let a = DenseNetwork::new(4, 3, NetworkParams::default(), 7);
        let b = DenseNetwork::new(4, 3, NetworkParams::default(), 7);
        assert_eq!(a.weights.len(), 15);
        assert!(a.weights.iter().all(|w| w.abs() <= INIT_RANGE));
        assert_eq!(a.weights, b.weights);
    }

    #[test]
    fn test_untrained_outputs_near_half() {
        let net = DenseNetwork::new(4, 3, NetworkParams::default(), 1);
        let out = net.run(&[1.0, 0.0, 1.0, 0.0]).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&o| (o - 0.5).abs() < 0.1));
    }

    #[test]
    fn test_separable_batch_converges() {
        let mut net = DenseNetwork::new(4, 3, NetworkParams::default(), 3);
        let batch = two_way_batch();
        let bit_fail = net.train(&batch, 20).unwrap();
        assert_eq!(bit_fail, 0);
        assert_eq!(net.bit_fail(), 0);

        let out = net.run(&[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert!(out[0] > 0.65 && out[2] > 0.65 && out[1] < 0.35);
        let out = net.run(&[0.0, 0.0, 1.0, 1.0]).unwrap();
        assert!(out[1] > 0.65 && out[0] < 0.35 && out[2] < 0.35);
    }

    #[test]
    fn test_first_pass_counts_every_wrong_unit() {
        // Untrained outputs sit near 0.5, so every unit is 0.5 away from its target.
        let mut net = DenseNetwork::new(4, 3, NetworkParams::default(), 5);
        let mut batch = TrainingBatch::with_capacity(1);
        batch.push(vec![1.0, 0.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]).unwrap();
        assert_eq!(net.train(&batch, 1).unwrap(), 3);
    }

    #[test]
    fn test_sum_clamped_before_steepness() {
        assert_eq!(scaled_sum(1.0e6, 0.5), 150.0);
        assert_eq!(scaled_sum(-1.0e6, 0.5), -150.0);
        assert_eq!(scaled_sum(4.0, 0.5), 2.0);
    }

    #[test]
    fn test_width_mismatch_is_an_error() {
        let mut net = DenseNetwork::new(2, 3, NetworkParams::default(), 0);
        assert!(net.run(&[1.0]).is_err());
        assert!(net.train(&two_way_batch(), 1).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.net");
        let mut net = DenseNetwork::new(4, 3, NetworkParams::default(), 11);
        net.train(&two_way_batch(), 2).unwrap();
        net.save(&path).unwrap();

        let loaded = DenseNetwork::load(&path).unwrap();
        assert_eq!(loaded.params(), net.params());
        let input = [1.0, 1.0, 0.0, 0.0];
        assert_eq!(loaded.run(&input).unwrap(), net.run(&input).unwrap());
    }
}
