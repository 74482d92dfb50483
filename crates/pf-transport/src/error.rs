//! Error types for transport algorithms.

use pf_core::CoreError;
use pf_network::NetworkError;
use pf_phase::PhaseError;
use pf_solver::SolverError;
use thiserror::Error;

use crate::health::Diagnosis;

pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while configuring or running a transport algorithm.
///
/// Solver non-convergence is not an error; it is reported through
/// `is_converged` on the solution.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Settings are missing or out of range, or refer to something absent.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// Caller-supplied arrays or indices are unusable.
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    /// Some clusters carry no boundary condition, so the system is singular.
    #[error(
        "Your network is clustered, making Ax = b ill-conditioned; \
         {} pore(s) are not connected to any boundary condition: {unreachable:?}",
        .unreachable.len()
    )]
    Topology { unreachable: Vec<usize> },

    /// `A` or `b` hold non-finite values.
    #[error("{0}")]
    NumericalHealth(Diagnosis),

    /// `A` and `b` were requested before being assembled.
    #[error("Linear system has not been assembled yet")]
    NotAssembled,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Property error: {0}")]
    Phase(#[from] PhaseError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

impl From<CoreError> for TransportError {
    fn from(err: CoreError) -> Self {
        TransportError::InvalidInput {
            what: err.to_string(),
        }
    }
}

impl TransportError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        TransportError::Configuration { what: what.into() }
    }

    pub(crate) fn input(what: impl Into<String>) -> Self {
        TransportError::InvalidInput { what: what.into() }
    }
}
