use statrs::statistics::Statistics;

const ENTROPY_BINS: usize = 256;

/// Shannon entropy in bits of the min-max-normalized signal over a 256-bin
/// histogram. A constant (or empty) signal has no spread to bin and scores
/// 0.0.
pub fn shannon_entropy(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let min = samples.min();
    let max = samples.max();
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return 0.0;
    }
    let mut histogram = [0u32; ENTROPY_BINS];
    for &value in samples {
        let bin = ((value - min) / range * ENTROPY_BINS as f64) as usize;
        histogram[bin.min(ENTROPY_BINS - 1)] += 1;
    }
    let total = samples.len() as f64;
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}

/// Pearson correlation, or `None` when it is undefined: mismatched lengths,
/// fewer than two samples, a constant vector, or a non-finite result.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let std_a = a.population_std_dev();
    let std_b = b.population_std_dev();
    if std_a == 0.0 || std_b == 0.0 {
        return None;
    }
    let correlation = a.population_covariance(b) / (std_a * std_b);
    correlation.is_finite().then_some(correlation)
}
