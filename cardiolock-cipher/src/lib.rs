//! Cardiolock cipher core – chaotic logistic-map encryption for ECG signal
//! vectors. This crate exposes the deterministic sequence generator, the
//! biometric key derivation formula, an offline-trained key predictor, and
//! the three cipher variants (classical XOR, biometric permute+XOR, and the
//! ML-keyed form of the same transform) that the attack harness in
//! `cardiolock-attack` evaluates.

pub mod analysis;
pub mod chaos;
pub mod cipher;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod keys;
pub mod predictor;
pub mod signal;

pub use analysis::{pearson_correlation, shannon_entropy};
pub use chaos::{
    apply_permutation, diffusion_permutation, invert_permutation, keystream_mask,
    logistic_sequence,
};
pub use cipher::{denormalize, CipherEngine, CipherText, CipherVariant, Sidecar};
pub use config::PredictorConfig;
pub use corpus::{synthetic_corpus, synthetic_signal};
pub use errors::{CipherError, CipherResult};
pub use keys::{derive_biometric_key, KeyParams};
pub use predictor::{KeyPredictor, MeanImputer, MinMaxScaler};
pub use signal::{Signal, SignalFeatures};
