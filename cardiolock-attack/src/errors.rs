use cardiolock_cipher::CipherError;
use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("evaluation batch must contain at least one signal")]
    EmptyBatch,
    #[error(transparent)]
    Cipher(#[from] CipherError),
}
