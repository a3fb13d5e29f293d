use std::f64::consts::PI;

use blake3::Hasher;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::errors::CipherResult;
use crate::signal::Signal;

/// Deterministic ECG-like waveform: two sine harmonics at 1.2 Hz and 2.4 Hz
/// over a ten-second window plus Gaussian noise at 0.3 amplitude, the same
/// shape the cipher was originally exercised with when no recorded corpus
/// was at hand. Seeded per (label, index) so every call reproduces the same
/// samples.
pub fn synthetic_signal(index: usize, samples: usize, seed_label: &str) -> CipherResult<Signal> {
    let mut hasher = Hasher::new();
    hasher.update(seed_label.as_bytes());
    hasher.update(&(index as u64).to_le_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(hasher.finalize().as_bytes());
    let mut rng = ChaCha20Rng::from_seed(seed);

    let stride = samples.saturating_sub(1).max(1) as f64;
    let values = (0..samples)
        .map(|step| {
            let t = 10.0 * step as f64 / stride;
            let noise: f64 = StandardNormal.sample(&mut rng);
            (2.0 * PI * 1.2 * t).sin() + 0.5 * (2.0 * PI * 2.4 * t).sin() + 0.3 * noise
        })
        .collect();
    Signal::with_id(format!("ECG_{:03}", index + 1), values)
}

/// A batch of `count` synthetic signals sharing one seed label.
pub fn synthetic_corpus(count: usize, samples: usize, seed_label: &str) -> CipherResult<Vec<Signal>> {
    (0..count)
        .map(|index| synthetic_signal(index, samples, seed_label))
        .collect()
}
