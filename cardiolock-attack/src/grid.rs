use cardiolock_cipher::{CipherVariant, KeyParams};
use serde::{Deserialize, Serialize};

/// Search-space geometry and budget for one attack run. The grids scale with
/// the nominal strength of the variant: the permutation- and
/// prediction-based schemes warrant a larger search budget and a higher
/// success bar, not a larger underlying key space.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttackGridConfig {
    pub r_min: f64,
    pub r_max: f64,
    pub r_steps: usize,
    pub x0_min: f64,
    pub x0_max: f64,
    pub x0_steps: usize,
    pub max_attempts: u32,
    pub success_threshold: f64,
}

impl AttackGridConfig {
    pub fn classical() -> Self {
        Self {
            r_min: 3.5,
            r_max: 4.0,
            r_steps: 20,
            x0_min: 0.1,
            x0_max: 0.9,
            x0_steps: 10,
            max_attempts: 200,
            success_threshold: 0.7,
        }
    }

    pub fn biometric() -> Self {
        Self {
            r_steps: 25,
            x0_steps: 16,
            max_attempts: 400,
            success_threshold: 0.8,
            ..Self::classical()
        }
    }

    pub fn ml_enhanced() -> Self {
        Self {
            r_steps: 30,
            x0_steps: 20,
            max_attempts: 600,
            success_threshold: 0.85,
            ..Self::classical()
        }
    }

    pub fn for_variant(variant: CipherVariant) -> Self {
        match variant {
            CipherVariant::Classical => Self::classical(),
            CipherVariant::Biometric => Self::biometric(),
            CipherVariant::MlEnhanced => Self::ml_enhanced(),
        }
    }

    pub fn grid_size(&self) -> u32 {
        (self.r_steps * self.x0_steps) as u32
    }

    /// All candidate keys in trial order: r outer, x0 inner, both ascending,
    /// endpoints inclusive.
    pub fn candidates(&self) -> Vec<KeyParams> {
        let r_values = linspace(self.r_min, self.r_max, self.r_steps);
        let x0_values = linspace(self.x0_min, self.x0_max, self.x0_steps);
        let mut candidates = Vec::with_capacity(r_values.len() * x0_values.len());
        for &r in &r_values {
            for &x0 in &x0_values {
                candidates.push(KeyParams { r, x0 });
            }
        }
        candidates
    }
}

fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    if steps <= 1 {
        return vec![start];
    }
    let stride = (end - start) / (steps - 1) as f64;
    (0..steps).map(|step| start + stride * step as f64).collect()
}
