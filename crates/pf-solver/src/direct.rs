//! Dense LU solver.

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use pf_core::Real;
use tracing::debug;

use crate::adapter::{CONVERGED, NOT_CONVERGED, SolverAdapter, SolverOutput, check_dimensions};
use crate::error::SolverResult;
use crate::sparse::to_dense;

/// Densifies `A` and solves by LU decomposition.
///
/// Suited to the small and medium networks the engine is usually run on.
/// A singular matrix yields `x0` back with a non-zero exit code.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSolver;

impl SolverAdapter for DirectSolver {
    fn name(&self) -> &str {
        "direct-lu"
    }

    fn solve(&self, a: &CsrMatrix<Real>, b: &[Real], x0: &[Real]) -> SolverResult<SolverOutput> {
        check_dimensions(a, b, x0)?;

        let rhs = DVector::from_column_slice(b);
        match to_dense(a).lu().solve(&rhs) {
            Some(x) if x.iter().all(|v| v.is_finite()) => Ok(SolverOutput {
                x: x.iter().copied().collect(),
                exit_code: CONVERGED,
                iterations: 1,
            }),
            _ => {
                debug!(n = a.nrows(), "LU solve failed: matrix is singular");
                Ok(SolverOutput {
                    x: x0.to_vec(),
                    exit_code: NOT_CONVERGED,
                    iterations: 1,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_sparse::CooMatrix;

    #[test]
    fn solves_small_system() {
        // [4 1; 1 3] x = [1; 2]  =>  x = [1/11, 7/11]
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, 4.0);
        coo.push(0, 1, 1.0);
        coo.push(1, 0, 1.0);
        coo.push(1, 1, 3.0);
        let a = CsrMatrix::from(&coo);

        let out = DirectSolver.solve(&a, &[1.0, 2.0], &[0.0, 0.0]).unwrap();
        assert!(out.converged());
        assert!((out.x[0] - 1.0 / 11.0).abs() < 1e-12);
        assert!((out.x[1] - 7.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn singular_matrix_reports_nonzero_exit_code() {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, 1.0);
        coo.push(0, 1, -1.0);
        coo.push(1, 0, -1.0);
        coo.push(1, 1, 1.0);
        let a = CsrMatrix::from(&coo);

        let out = DirectSolver.solve(&a, &[1.0, 0.0], &[0.5, 0.5]).unwrap();
        assert_eq!(out.exit_code, NOT_CONVERGED);
        assert_eq!(out.x, vec![0.5, 0.5]);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let a = CsrMatrix::from(&CooMatrix::<Real>::new(2, 2));
        assert!(DirectSolver.solve(&a, &[1.0], &[0.0, 0.0]).is_err());
    }
}
