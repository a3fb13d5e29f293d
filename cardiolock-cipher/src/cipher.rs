use serde::{Deserialize, Serialize};

use crate::chaos::{
    apply_permutation, diffusion_permutation, invert_permutation, keystream_mask,
    logistic_sequence,
};
use crate::errors::{CipherError, CipherResult};
use crate::keys::KeyParams;
use crate::signal::Signal;

/// The three cipher variants, dispatched as a closed enum at the call site.
/// Classical applies confusion only (keystream XOR); Biometric and
/// MlEnhanced share the permute-then-XOR transform and differ solely in how
/// the caller sources the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherVariant {
    Classical,
    Biometric,
    MlEnhanced,
}

impl CipherVariant {
    pub const ALL: [CipherVariant; 3] = [
        CipherVariant::Classical,
        CipherVariant::Biometric,
        CipherVariant::MlEnhanced,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CipherVariant::Classical => "classical",
            CipherVariant::Biometric => "biometric",
            CipherVariant::MlEnhanced => "ml-enhanced",
        }
    }

    pub fn uses_permutation(&self) -> bool {
        !matches!(self, CipherVariant::Classical)
    }
}

/// Encrypted byte stream; always exactly as long as the plaintext.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CipherText {
    pub bytes: Vec<u8>,
}

/// Non-secret metadata that travels with the ciphertext: the normalization
/// range and, for permuted variants, the diffusion permutation. The XOR
/// mask is re-derivable from the key and is never stored here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sidecar {
    pub min: f64,
    pub max: f64,
    pub permutation: Option<Vec<usize>>,
}

impl Sidecar {
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CipherEngine {
    variant: CipherVariant,
}

impl CipherEngine {
    pub fn new(variant: CipherVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> CipherVariant {
        self.variant
    }

    /// Normalize, optionally permute, then XOR with the keystream mask.
    /// Nothing is returned on failure; there is no partial ciphertext.
    pub fn encrypt(&self, signal: &Signal, key: &KeyParams) -> CipherResult<(CipherText, Sidecar)> {
        let samples = signal.samples();
        let sequence = logistic_sequence(key, samples.len())?;
        let mask = keystream_mask(&sequence);
        let (scaled, min, max) = normalize_to_bytes(samples);
        let (staged, permutation) = if self.variant.uses_permutation() {
            let permutation = diffusion_permutation(&sequence);
            (apply_permutation(&scaled, &permutation), Some(permutation))
        } else {
            (scaled, None)
        };
        let bytes = staged
            .iter()
            .zip(&mask)
            .map(|(byte, mask_byte)| byte ^ mask_byte)
            .collect();
        Ok((CipherText { bytes }, Sidecar { min, max, permutation }))
    }

    /// Reverses encryption: XOR with the regenerated mask, undo the sidecar
    /// permutation (re-derived from the key when the sidecar omits it), then
    /// de-normalize into the sidecar range.
    pub fn decrypt(
        &self,
        ciphertext: &CipherText,
        key: &KeyParams,
        sidecar: &Sidecar,
    ) -> CipherResult<Vec<f64>> {
        let n = ciphertext.bytes.len();
        let sequence = logistic_sequence(key, n)?;
        let mask = keystream_mask(&sequence);
        let unmasked: Vec<u8> = ciphertext
            .bytes
            .iter()
            .zip(&mask)
            .map(|(byte, mask_byte)| byte ^ mask_byte)
            .collect();
        let scaled = if self.variant.uses_permutation() {
            let inverse = match &sidecar.permutation {
                Some(stored) => {
                    if stored.len() != n {
                        return Err(CipherError::SidecarMismatch {
                            expected: n,
                            actual: stored.len(),
                        });
                    }
                    invert_permutation(stored)
                }
                None => invert_permutation(&diffusion_permutation(&sequence)),
            };
            apply_permutation(&unmasked, &inverse)
        } else {
            unmasked
        };
        Ok(denormalize(&scaled, sidecar.min, sidecar.max))
    }
}

/// 8-bit quantization into the signal's own range. A constant signal has no
/// range to scale into and quantizes to all-zero bytes.
fn normalize_to_bytes(samples: &[f64]) -> (Vec<u8>, f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in samples {
        min = min.min(value);
        max = max.max(value);
    }
    let range = max - min;
    let scaled = if range > 0.0 {
        samples
            .iter()
            .map(|&value| ((value - min) / range * 255.0).round() as u8)
            .collect()
    } else {
        vec![0u8; samples.len()]
    };
    (scaled, min, max)
}

/// Maps quantized bytes back into the sidecar range.
pub fn denormalize(scaled: &[u8], min: f64, max: f64) -> Vec<f64> {
    scaled
        .iter()
        .map(|&byte| f64::from(byte) / 255.0 * (max - min) + min)
        .collect()
}
