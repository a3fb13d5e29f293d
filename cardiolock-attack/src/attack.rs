use cardiolock_cipher::{
    apply_permutation, denormalize, diffusion_permutation, invert_permutation, keystream_mask,
    logistic_sequence, pearson_correlation, CipherText, CipherVariant, KeyParams, Sidecar, Signal,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::AttackGridConfig;

/// Outcome of one grid search against one (signal, variant) pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttackResult {
    pub success: bool,
    pub attempts: u32,
    /// Highest |Pearson correlation| observed across scored trials.
    pub best_match: f64,
    pub best_params: Option<KeyParams>,
    /// Fraction of the grid consumed; 1.0 exactly when the full grid was
    /// searched without early success.
    pub success_rate: f64,
}

/// Grid-search adversary. Knows the cipher variant, ciphertext, and sidecar
/// range, re-derives candidate permutations from candidate keys, and scores
/// reconstructions against the true plaintext (available for measurement
/// only, not to a real attacker).
#[derive(Clone, Debug)]
pub struct AttackSimulator {
    variant: CipherVariant,
    config: AttackGridConfig,
}

impl AttackSimulator {
    pub fn new(variant: CipherVariant) -> Self {
        Self {
            variant,
            config: AttackGridConfig::for_variant(variant),
        }
    }

    pub fn with_config(variant: CipherVariant, config: AttackGridConfig) -> Self {
        Self { variant, config }
    }

    pub fn variant(&self) -> CipherVariant {
        self.variant
    }

    pub fn config(&self) -> &AttackGridConfig {
        &self.config
    }

    /// Sequential search in trial order with early exit once a trial clears
    /// the success threshold or the attempt budget runs out. A trial whose
    /// correlation is undefined is counted and skipped.
    pub fn run(&self, ciphertext: &CipherText, sidecar: &Sidecar, plaintext: &Signal) -> AttackResult {
        let candidates = self.config.candidates();
        let grid_size = candidates.len() as u32;
        let mut attempts = 0u32;
        let mut success = false;
        let mut best_match = 0.0f64;
        let mut best_params = None;
        for candidate in &candidates {
            attempts += 1;
            if let Some(correlation) = self.try_candidate(candidate, ciphertext, sidecar, plaintext) {
                if correlation > best_match {
                    best_match = correlation;
                    best_params = Some(*candidate);
                }
                if correlation > self.config.success_threshold {
                    success = true;
                    break;
                }
            }
            if attempts >= self.config.max_attempts {
                break;
            }
        }
        debug!(
            variant = self.variant.label(),
            attempts, best_match, success, "grid search finished"
        );
        AttackResult {
            success,
            attempts,
            best_match,
            best_params,
            success_rate: success_rate(attempts, grid_size),
        }
    }

    /// Parallel full sweep over the first `min(grid, max_attempts)` trials.
    /// Early exit is disabled; the reduction keeps the best |correlation|
    /// across all evaluated trials with lowest-trial-index tie-breaking, so
    /// the result never depends on worker scheduling.
    pub fn run_parallel(
        &self,
        ciphertext: &CipherText,
        sidecar: &Sidecar,
        plaintext: &Signal,
    ) -> AttackResult {
        let mut candidates = self.config.candidates();
        let grid_size = candidates.len() as u32;
        candidates.truncate(self.config.max_attempts as usize);
        let attempts = candidates.len() as u32;

        let best = candidates
            .par_iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                self.try_candidate(candidate, ciphertext, sidecar, plaintext)
                    .map(|correlation| (index, *candidate, correlation))
            })
            .reduce_with(|left, right| {
                if right.2 > left.2 || (right.2 == left.2 && right.0 < left.0) {
                    right
                } else {
                    left
                }
            });

        let (best_match, best_params) = match best {
            Some((_, candidate, correlation)) => (correlation, Some(candidate)),
            None => (0.0, None),
        };
        let success = best_match > self.config.success_threshold;
        debug!(
            variant = self.variant.label(),
            attempts, best_match, success, "parallel grid sweep finished"
        );
        AttackResult {
            success,
            attempts,
            best_match,
            best_params,
            success_rate: success_rate(attempts, grid_size),
        }
    }

    /// One trial: rebuild the keystream from the candidate key, invert the
    /// cipher transform, and score the reconstruction. `None` marks an
    /// unusable trial (generator rejection or undefined correlation).
    fn try_candidate(
        &self,
        candidate: &KeyParams,
        ciphertext: &CipherText,
        sidecar: &Sidecar,
        plaintext: &Signal,
    ) -> Option<f64> {
        let sequence = logistic_sequence(candidate, ciphertext.bytes.len()).ok()?;
        let mask = keystream_mask(&sequence);
        let unmasked: Vec<u8> = ciphertext
            .bytes
            .iter()
            .zip(&mask)
            .map(|(byte, mask_byte)| byte ^ mask_byte)
            .collect();
        let scaled = if self.variant.uses_permutation() {
            let permutation = diffusion_permutation(&sequence);
            apply_permutation(&unmasked, &invert_permutation(&permutation))
        } else {
            unmasked
        };
        let reconstruction = denormalize(&scaled, sidecar.min, sidecar.max);
        let correlation = pearson_correlation(plaintext.samples(), &reconstruction)?;
        Some(correlation.abs())
    }
}

fn success_rate(attempts: u32, grid_size: u32) -> f64 {
    if attempts < grid_size {
        f64::from(attempts) / f64::from(grid_size)
    } else {
        1.0
    }
}
