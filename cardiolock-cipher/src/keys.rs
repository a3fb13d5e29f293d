use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::errors::{CipherError, CipherResult};

/// Lower edge of the derived chaotic control parameter.
pub const R_FLOOR: f64 = 3.6;
/// Width of the band the derived `r` folds into.
pub const R_SPAN: f64 = 0.4;
/// Lower edge of the derived initial condition.
pub const X0_FLOOR: f64 = 0.1;
/// Width of the band the derived `x0` folds into.
pub const X0_SPAN: f64 = 0.8;

/// Secret control pair for the logistic keystream. Serialization exists so
/// attack results can report the best candidate found; production keys stay
/// out-of-band and are never embedded in ciphertext or sidecar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyParams {
    pub r: f64,
    pub x0: f64,
}

impl KeyParams {
    pub fn new(r: f64, x0: f64) -> CipherResult<Self> {
        let key = Self { r, x0 };
        key.validate()?;
        Ok(key)
    }

    /// The map keeps its iterates inside [0, 1] only for r in (0, 4] and
    /// x0 in (0, 1); everything else is rejected before any iterate leaks.
    pub fn validate(&self) -> CipherResult<()> {
        let r_admissible = self.r > 0.0 && self.r <= 4.0;
        let x0_admissible = self.x0 > 0.0 && self.x0 < 1.0;
        if !r_admissible || !x0_admissible {
            return Err(CipherError::InvalidKeyDomain {
                r: self.r,
                x0: self.x0,
            });
        }
        Ok(())
    }
}

/// Deterministic biometric key extraction from the first two moments:
/// r = 3.6 + (stddev mod 0.4), x0 = 0.1 + (mean mod 0.8). Population
/// moments, Euclidean remainder, so negative-mean signals still fold into
/// the admissible band. A zero-variance signal is valid and yields r = 3.6
/// exactly.
pub fn derive_biometric_key(samples: &[f64]) -> KeyParams {
    let mean = samples.mean();
    let std_dev = samples.population_std_dev();
    KeyParams {
        r: R_FLOOR + std_dev.rem_euclid(R_SPAN),
        x0: X0_FLOOR + mean.rem_euclid(X0_SPAN),
    }
}
