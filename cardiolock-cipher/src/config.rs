use serde::{Deserialize, Serialize};

/// Training knobs for the key predictor. Defaults mirror the corpus-scale
/// regression setup the cipher was originally benchmarked with: two hidden
/// layers of 64 and 32 units, 1000 epochs of Adam at 1e-3, batches capped at
/// 200 rows, and a 20% holdout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub hidden_layers: Vec<usize>,
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub holdout_fraction: f64,
    /// Label hashed into the deterministic seed for weight init, shuffling,
    /// and the holdout split.
    pub seed_label: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![64, 32],
            epochs: 1000,
            learning_rate: 1e-3,
            batch_size: 200,
            holdout_fraction: 0.2,
            seed_label: "cardiolock/key-predictor".into(),
        }
    }
}
