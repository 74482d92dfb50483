//! Error types for solver operations.

use pf_core::CoreError;
use thiserror::Error;

/// Errors raised by solver adapters.
///
/// Failing to converge is not an error: adapters report it through a
/// non-zero exit code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Dimension mismatch: {what}")]
    Dimension { what: String },

    #[error("Invalid solver configuration: {what}")]
    Config { what: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] CoreError),
}

pub type SolverResult<T> = Result<T, SolverError>;
