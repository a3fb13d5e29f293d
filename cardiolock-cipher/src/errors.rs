use thiserror::Error;

pub type CipherResult<T> = Result<T, CipherError>;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("key parameters outside the admissible chaotic domain: r={r}, x0={x0}")]
    InvalidKeyDomain { r: f64, x0: f64 },
    #[error("signal length {actual} does not match the trained dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("signal must contain at least one sample")]
    EmptySignal,
    #[error("non-finite sample at index {index}")]
    NonFiniteSample { index: usize },
    #[error("corpus must contain at least one signal")]
    EmptyCorpus,
    #[error("sidecar permutation length {actual} does not match ciphertext length {expected}")]
    SidecarMismatch { expected: usize, actual: usize },
}
