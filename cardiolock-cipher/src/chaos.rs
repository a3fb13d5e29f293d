use crate::errors::CipherResult;
use crate::keys::KeyParams;

/// Iterates x_{t+1} = r * x_t * (1 - x_t) starting from x0, excluding x0
/// itself from the output. Pure and O(n); the only allocation is the output
/// buffer. Fails with `InvalidKeyDomain` when the key falls outside the
/// bounded-iterate domain.
pub fn logistic_sequence(key: &KeyParams, n: usize) -> CipherResult<Vec<f64>> {
    key.validate()?;
    let mut sequence = Vec::with_capacity(n);
    let mut x = key.x0;
    for _ in 0..n {
        x = key.r * x * (1.0 - x);
        sequence.push(x);
    }
    Ok(sequence)
}

/// Byte-wise XOR mask: floor(x * 255) per iterate.
pub fn keystream_mask(sequence: &[f64]) -> Vec<u8> {
    sequence.iter().map(|x| (x * 255.0).floor() as u8).collect()
}

/// Rank order of the sequence (stable argsort). Ties keep index order so
/// the permutation is deterministic even when the map collapses.
pub fn diffusion_permutation(sequence: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..sequence.len()).collect();
    indices.sort_by(|&a, &b| sequence[a].total_cmp(&sequence[b]));
    indices
}

/// Gathers `values[permutation[i]]` into position i.
pub fn apply_permutation<T: Copy>(values: &[T], permutation: &[usize]) -> Vec<T> {
    permutation.iter().map(|&index| values[index]).collect()
}

/// Inverse permutation: applying the result after `permutation` restores the
/// original order.
pub fn invert_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0usize; permutation.len()];
    for (position, &source) in permutation.iter().enumerate() {
        inverse[source] = position;
    }
    inverse
}
