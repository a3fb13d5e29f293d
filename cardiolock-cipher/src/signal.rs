use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::analysis::shannon_entropy;
use crate::errors::{CipherError, CipherResult};

/// Peaks below this amplitude are treated as baseline wander rather than
/// beats.
pub const DEFAULT_PEAK_THRESHOLD: f64 = 0.5;

/// An ordered, validated sample vector. Signals handed to the engine are
/// already imputed: construction rejects empty vectors and non-finite
/// samples, and there are no mutating accessors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signal {
    id: Option<String>,
    samples: Vec<f64>,
}

impl Signal {
    pub fn new(samples: Vec<f64>) -> CipherResult<Self> {
        Self::build(None, samples)
    }

    pub fn with_id(id: impl Into<String>, samples: Vec<f64>) -> CipherResult<Self> {
        Self::build(Some(id.into()), samples)
    }

    fn build(id: Option<String>, samples: Vec<f64>) -> CipherResult<Self> {
        if samples.is_empty() {
            return Err(CipherError::EmptySignal);
        }
        for (index, value) in samples.iter().enumerate() {
            if !value.is_finite() {
                return Err(CipherError::NonFiniteSample { index });
            }
        }
        Ok(Self { id, samples })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Indices of strict local maxima above `threshold`.
    pub fn peaks(&self, threshold: f64) -> Vec<usize> {
        let samples = &self.samples;
        (1..samples.len().saturating_sub(1))
            .filter(|&i| {
                samples[i] > samples[i - 1] && samples[i] > samples[i + 1] && samples[i] > threshold
            })
            .collect()
    }

    pub fn features(&self) -> SignalFeatures {
        SignalFeatures {
            mean: self.samples.as_slice().mean(),
            std_dev: self.samples.as_slice().population_std_dev(),
            entropy: shannon_entropy(&self.samples),
            peak_count: self.peaks(DEFAULT_PEAK_THRESHOLD).len(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SignalFeatures {
    pub mean: f64,
    pub std_dev: f64,
    pub entropy: f64,
    pub peak_count: usize,
}
