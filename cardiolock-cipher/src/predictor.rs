use blake3::Hasher;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PredictorConfig;
use crate::errors::{CipherError, CipherResult};
use crate::keys::{derive_biometric_key, KeyParams};

/// Column-wise mean imputation fitted over a corpus. Non-finite entries are
/// replaced by the fitted column mean; a column with no finite entries falls
/// back to 0.0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeanImputer {
    means: Vec<f64>,
}

impl MeanImputer {
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let mut means = vec![0.0; width];
        for (column, mean) in means.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut count = 0usize;
            for row in rows {
                let value = row[column];
                if value.is_finite() {
                    sum += value;
                    count += 1;
                }
            }
            if count > 0 {
                *mean = sum / count as f64;
            }
        }
        Self { means }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .map(|(&value, &mean)| if value.is_finite() { value } else { mean })
            .collect()
    }
}

/// Column-wise min-max scaling fitted over a corpus. A constant column maps
/// to 0.0 instead of dividing by a zero range.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    ranges: Vec<f64>,
}

impl MinMaxScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let mut mins = vec![f64::INFINITY; width];
        let mut maxs = vec![f64::NEG_INFINITY; width];
        for row in rows {
            for (column, &value) in row.iter().enumerate() {
                mins[column] = mins[column].min(value);
                maxs[column] = maxs[column].max(value);
            }
        }
        let ranges = mins
            .iter()
            .zip(&maxs)
            .map(|(&lo, &hi)| hi - lo)
            .collect();
        Self { mins, ranges }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mins.iter().zip(&self.ranges))
            .map(|(&value, (&lo, &range))| {
                if range > 0.0 {
                    (value - lo) / range
                } else {
                    0.0
                }
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DenseLayer {
    // weights[unit][feature]
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl DenseLayer {
    fn glorot(rng: &mut ChaCha20Rng, fan_in: usize, fan_out: usize) -> Self {
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        let weights = (0..fan_out)
            .map(|_| (0..fan_in).map(|_| rng.gen_range(-limit..limit)).collect())
            .collect();
        Self {
            weights,
            biases: vec![0.0; fan_out],
        }
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias
            })
            .collect()
    }
}

fn forward(layers: &[DenseLayer], input: &[f64]) -> Vec<f64> {
    let last = layers.len() - 1;
    let mut current = input.to_vec();
    for (depth, layer) in layers.iter().enumerate() {
        current = layer.forward(&current);
        if depth < last {
            relu_in_place(&mut current);
        }
    }
    current
}

fn relu_in_place(values: &mut [f64]) {
    for value in values {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// activations[0] is the input; activations[k] the post-activation output of
/// layer k-1. The last layer stays linear.
fn forward_trace(layers: &[DenseLayer], input: &[f64]) -> Vec<Vec<f64>> {
    let last = layers.len() - 1;
    let mut activations: Vec<Vec<f64>> = vec![input.to_vec()];
    for (depth, layer) in layers.iter().enumerate() {
        let mut output = layer.forward(&activations[depth]);
        if depth < last {
            relu_in_place(&mut output);
        }
        activations.push(output);
    }
    activations
}

struct Gradients {
    weights: Vec<Vec<Vec<f64>>>,
    biases: Vec<Vec<f64>>,
}

impl Gradients {
    fn zeroed_like(layers: &[DenseLayer]) -> Self {
        Self {
            weights: layers
                .iter()
                .map(|layer| layer.weights.iter().map(|row| vec![0.0; row.len()]).collect())
                .collect(),
            biases: layers.iter().map(|layer| vec![0.0; layer.biases.len()]).collect(),
        }
    }
}

/// Backpropagates one sample's squared-error gradient into `grads`.
fn accumulate_gradients(
    layers: &[DenseLayer],
    activations: &[Vec<f64>],
    target: &[f64; 2],
    grads: &mut Gradients,
) {
    let depth_count = layers.len();
    let output = &activations[depth_count];
    let mut delta: Vec<f64> = output
        .iter()
        .zip(target.iter())
        .map(|(out, expected)| out - expected)
        .collect();
    for depth in (0..depth_count).rev() {
        let input = &activations[depth];
        for (unit, delta_value) in delta.iter().enumerate() {
            grads.biases[depth][unit] += delta_value;
            for (feature, input_value) in input.iter().enumerate() {
                grads.weights[depth][unit][feature] += delta_value * input_value;
            }
        }
        if depth > 0 {
            let mut next_delta = vec![0.0; input.len()];
            for (unit, delta_value) in delta.iter().enumerate() {
                for (feature, weight) in layers[depth].weights[unit].iter().enumerate() {
                    next_delta[feature] += delta_value * weight;
                }
            }
            // ReLU gate: clipped units pass no gradient
            for (feature, value) in next_delta.iter_mut().enumerate() {
                if input[feature] <= 0.0 {
                    *value = 0.0;
                }
            }
            delta = next_delta;
        }
    }
}

struct AdamOptimizer {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: i32,
    first_moment: Gradients,
    second_moment: Gradients,
}

impl AdamOptimizer {
    fn new(layers: &[DenseLayer], learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            step: 0,
            first_moment: Gradients::zeroed_like(layers),
            second_moment: Gradients::zeroed_like(layers),
        }
    }

    fn apply(&mut self, layers: &mut [DenseLayer], grads: &Gradients, batch_len: f64) {
        self.step += 1;
        let correction1 = 1.0 - self.beta1.powi(self.step);
        let correction2 = 1.0 - self.beta2.powi(self.step);
        for (depth, layer) in layers.iter_mut().enumerate() {
            for (unit, bias) in layer.biases.iter_mut().enumerate() {
                let gradient = grads.biases[depth][unit] / batch_len;
                let m = &mut self.first_moment.biases[depth][unit];
                let v = &mut self.second_moment.biases[depth][unit];
                *m = self.beta1 * *m + (1.0 - self.beta1) * gradient;
                *v = self.beta2 * *v + (1.0 - self.beta2) * gradient * gradient;
                *bias -= self.learning_rate * (*m / correction1)
                    / ((*v / correction2).sqrt() + self.epsilon);
            }
            for (unit, row) in layer.weights.iter_mut().enumerate() {
                for (feature, weight) in row.iter_mut().enumerate() {
                    let gradient = grads.weights[depth][unit][feature] / batch_len;
                    let m = &mut self.first_moment.weights[depth][unit][feature];
                    let v = &mut self.second_moment.weights[depth][unit][feature];
                    *m = self.beta1 * *m + (1.0 - self.beta1) * gradient;
                    *v = self.beta2 * *v + (1.0 - self.beta2) * gradient * gradient;
                    *weight -= self.learning_rate * (*m / correction1)
                        / ((*v / correction2).sqrt() + self.epsilon);
                }
            }
        }
    }
}

fn seeded_rng(label: &str) -> ChaCha20Rng {
    let mut hasher = Hasher::new();
    hasher.update(label.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(hasher.finalize().as_bytes());
    ChaCha20Rng::from_seed(seed)
}

/// Frozen regression state mapping an imputed, min-max-scaled signal vector
/// to an estimated key pair. Trained once offline; immutable afterwards and
/// safe to share by reference across concurrent callers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyPredictor {
    imputer: MeanImputer,
    scaler: MinMaxScaler,
    layers: Vec<DenseLayer>,
    dimension: usize,
    holdout_mse: Option<f64>,
}

impl KeyPredictor {
    /// One-shot batch training: impute, derive the biometric targets, scale,
    /// split off a deterministic holdout, then fit the MLP with mini-batch
    /// Adam. Output biases start at the target means so undertrained
    /// predictions already sit inside the derived key band.
    pub fn train(corpus: &[Vec<f64>], config: &PredictorConfig) -> CipherResult<Self> {
        let first = corpus.first().ok_or(CipherError::EmptyCorpus)?;
        let dimension = first.len();
        if dimension == 0 {
            return Err(CipherError::EmptySignal);
        }
        for row in corpus {
            if row.len() != dimension {
                return Err(CipherError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
        }

        let imputer = MeanImputer::fit(corpus);
        let imputed: Vec<Vec<f64>> = corpus.iter().map(|row| imputer.transform(row)).collect();
        let targets: Vec<[f64; 2]> = imputed
            .iter()
            .map(|row| {
                let key = derive_biometric_key(row);
                [key.r, key.x0]
            })
            .collect();
        let scaler = MinMaxScaler::fit(&imputed);
        let inputs: Vec<Vec<f64>> = imputed.iter().map(|row| scaler.transform(row)).collect();

        let mut rng = seeded_rng(&config.seed_label);
        let mut order: Vec<usize> = (0..inputs.len()).collect();
        order.shuffle(&mut rng);
        let holdout_len = ((inputs.len() as f64) * config.holdout_fraction).round() as usize;
        let holdout_len = holdout_len.min(inputs.len() - 1);
        let (holdout_rows, train_rows) = order.split_at(holdout_len);

        let mut layers = Vec::with_capacity(config.hidden_layers.len() + 1);
        let mut fan_in = dimension;
        for &width in &config.hidden_layers {
            layers.push(DenseLayer::glorot(&mut rng, fan_in, width));
            fan_in = width;
        }
        layers.push(DenseLayer::glorot(&mut rng, fan_in, 2));
        let train_count = train_rows.len() as f64;
        if let Some(output_layer) = layers.last_mut() {
            let mut r_mean = 0.0;
            let mut x0_mean = 0.0;
            for &row in train_rows {
                r_mean += targets[row][0];
                x0_mean += targets[row][1];
            }
            output_layer.biases = vec![r_mean / train_count, x0_mean / train_count];
        }

        let batch_size = config.batch_size.clamp(1, train_rows.len());
        let mut optimizer = AdamOptimizer::new(&layers, config.learning_rate);
        let mut schedule = train_rows.to_vec();
        for _ in 0..config.epochs {
            schedule.shuffle(&mut rng);
            for batch in schedule.chunks(batch_size) {
                let mut grads = Gradients::zeroed_like(&layers);
                for &row in batch {
                    let activations = forward_trace(&layers, &inputs[row]);
                    accumulate_gradients(&layers, &activations, &targets[row], &mut grads);
                }
                optimizer.apply(&mut layers, &grads, batch.len() as f64);
            }
        }

        let holdout_mse = if holdout_rows.is_empty() {
            None
        } else {
            let total: f64 = holdout_rows
                .iter()
                .map(|&row| {
                    let output = forward(&layers, &inputs[row]);
                    let target = targets[row];
                    ((output[0] - target[0]).powi(2) + (output[1] - target[1]).powi(2)) / 2.0
                })
                .sum();
            Some(total / holdout_rows.len() as f64)
        };

        debug!(
            dimension,
            train_rows = train_rows.len(),
            holdout_rows = holdout_rows.len(),
            holdout_mse,
            "key predictor trained"
        );

        Ok(Self {
            imputer,
            scaler,
            layers,
            dimension,
            holdout_mse,
        })
    }

    pub fn input_dimension(&self) -> usize {
        self.dimension
    }

    pub fn holdout_mse(&self) -> Option<f64> {
        self.holdout_mse
    }

    /// Applies the frozen imputer, scaler, and network. The sample length
    /// must match the training dimension; the predictor never truncates or
    /// pads. Predictions are not clamped: an out-of-domain estimate fails
    /// later at the sequence generator instead of silently folding.
    pub fn predict(&self, samples: &[f64]) -> CipherResult<KeyParams> {
        if samples.len() != self.dimension {
            return Err(CipherError::DimensionMismatch {
                expected: self.dimension,
                actual: samples.len(),
            });
        }
        let scaled = self.scaler.transform(&self.imputer.transform(samples));
        let output = forward(&self.layers, &scaled);
        Ok(KeyParams {
            r: output[0],
            x0: output[1],
        })
    }
}
