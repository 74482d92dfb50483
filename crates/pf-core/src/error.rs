use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite value in {what} at index {index}: {value}")]
    NonFinite {
        what: String,
        index: usize,
        value: f64,
    },

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },
}
