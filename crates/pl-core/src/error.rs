use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Signal '{signal}' is already present in the store")]
    DuplicateSignal { signal: String },

    #[error("Signal '{signal}' has length {len}, store length is {expected}")]
    LengthMismatch {
        signal: String,
        len: usize,
        expected: usize,
    },

    #[error("Signal '{signal}' not found in the store")]
    SignalNotFound { signal: String },

    #[error("Index out of bounds for '{signal}' (index={index}, len={len})")]
    IndexOob {
        signal: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
