//! The solver contract consumed by the transport engine.

use nalgebra_sparse::CsrMatrix;
use pf_core::Real;

use crate::error::{SolverError, SolverResult};

/// Exit code reported on convergence.
pub const CONVERGED: i32 = 0;
/// Exit code reported when the solver stopped without converging.
pub const NOT_CONVERGED: i32 = 1;

/// Result of a linear solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    /// Solution (or latest iterate)
    pub x: Vec<Real>,
    /// 0 = converged
    pub exit_code: i32,
    /// Iterations performed (1 for direct solves)
    pub iterations: usize,
}

impl SolverOutput {
    pub fn converged(&self) -> bool {
        self.exit_code == CONVERGED
    }
}

/// Pluggable linear-system solver.
pub trait SolverAdapter {
    /// Solver name for logging.
    fn name(&self) -> &str;

    /// Solve `A x = b` starting from `x0`.
    fn solve(&self, a: &CsrMatrix<Real>, b: &[Real], x0: &[Real]) -> SolverResult<SolverOutput>;
}

/// Check that `A` is square and matches `b` and `x0`.
pub(crate) fn check_dimensions(a: &CsrMatrix<Real>, b: &[Real], x0: &[Real]) -> SolverResult<()> {
    if a.nrows() != a.ncols() {
        return Err(SolverError::Dimension {
            what: format!("A is {}x{}, expected square", a.nrows(), a.ncols()),
        });
    }
    if b.len() != a.nrows() || x0.len() != a.nrows() {
        return Err(SolverError::Dimension {
            what: format!(
                "A is {}x{} but b has {} and x0 has {} entries",
                a.nrows(),
                a.ncols(),
                b.len(),
                x0.len()
            ),
        });
    }
    Ok(())
}
