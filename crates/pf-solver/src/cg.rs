//! Jacobi-preconditioned conjugate gradient.

use nalgebra_sparse::CsrMatrix;
use pf_core::{Real, norm};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{CONVERGED, NOT_CONVERGED, SolverAdapter, SolverOutput, check_dimensions};
use crate::error::{SolverError, SolverResult};
use crate::sparse::{diagonal, matvec};

/// Conjugate gradient configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CgConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Relative tolerance on |r| / |b|
    pub rel_tol: Real,
    /// Absolute tolerance on |r|
    pub abs_tol: Real,
}

impl Default for CgConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            rel_tol: 1e-10,
            abs_tol: 1e-14,
        }
    }
}

/// Conjugate gradient for symmetric positive definite systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConjugateGradient {
    pub config: CgConfig,
}

impl ConjugateGradient {
    pub fn new(config: CgConfig) -> SolverResult<Self> {
        if config.max_iterations == 0 || config.rel_tol < 0.0 || config.abs_tol < 0.0 {
            return Err(SolverError::Config {
                what: format!("{:?}", config),
            });
        }
        Ok(Self { config })
    }
}

fn dot(a: &[Real], b: &[Real]) -> Real {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl SolverAdapter for ConjugateGradient {
    fn name(&self) -> &str {
        "conjugate-gradient"
    }

    fn solve(&self, a: &CsrMatrix<Real>, b: &[Real], x0: &[Real]) -> SolverResult<SolverOutput> {
        check_dimensions(a, b, x0)?;
        let cfg = &self.config;

        // Jacobi preconditioner; zero diagonals fall back to identity
        let inv_diag: Vec<Real> = diagonal(a)
            .into_iter()
            .map(|d| if d != 0.0 { 1.0 / d } else { 1.0 })
            .collect();

        let mut x = x0.to_vec();
        let ax = matvec(a, &x);
        let mut r: Vec<Real> = b.iter().zip(&ax).map(|(bi, axi)| bi - axi).collect();
        let tol = cfg.abs_tol.max(cfg.rel_tol * norm(b));

        let mut z: Vec<Real> = r.iter().zip(&inv_diag).map(|(ri, di)| ri * di).collect();
        let mut p = z.clone();
        let mut rz = dot(&r, &z);
        let mut iterations = cfg.max_iterations;

        for iter in 0..cfg.max_iterations {
            let r_norm = norm(&r);
            if r_norm <= tol {
                return Ok(SolverOutput {
                    x,
                    exit_code: CONVERGED,
                    iterations: iter,
                });
            }

            let ap = matvec(a, &p);
            let pap = dot(&p, &ap);
            if pap <= 0.0 || !pap.is_finite() {
                debug!(iter, pap, "CG breakdown: matrix not positive definite");
                iterations = iter;
                break;
            }
            let alpha = rz / pap;
            for i in 0..x.len() {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }

            for i in 0..z.len() {
                z[i] = r[i] * inv_diag[i];
            }
            let rz_new = dot(&r, &z);
            let beta = rz_new / rz;
            rz = rz_new;
            for i in 0..p.len() {
                p[i] = z[i] + beta * p[i];
            }
        }

        let converged = norm(&r) <= tol;
        Ok(SolverOutput {
            x,
            exit_code: if converged { CONVERGED } else { NOT_CONVERGED },
            iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direct::DirectSolver;
    use nalgebra_sparse::CooMatrix;

    fn tridiagonal(n: usize) -> CsrMatrix<Real> {
        let mut coo = CooMatrix::new(n, n);
        for i in 0..n {
            coo.push(i, i, 4.0);
            if i + 1 < n {
                coo.push(i, i + 1, -1.0);
                coo.push(i + 1, i, -1.0);
            }
        }
        CsrMatrix::from(&coo)
    }

    #[test]
    fn matches_direct_solver() {
        let a = tridiagonal(20);
        let b: Vec<Real> = (0..20).map(|i| i as Real).collect();
        let x0 = vec![0.0; 20];

        let cg = ConjugateGradient::default().solve(&a, &b, &x0).unwrap();
        let lu = DirectSolver.solve(&a, &b, &x0).unwrap();
        assert!(cg.converged());
        for (u, v) in cg.x.iter().zip(&lu.x) {
            assert!((u - v).abs() < 1e-8);
        }
    }

    #[test]
    fn zero_rhs_converges_immediately() {
        let a = tridiagonal(5);
        let out = ConjugateGradient::default()
            .solve(&a, &[0.0; 5], &[0.0; 5])
            .unwrap();
        assert!(out.converged());
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn iteration_cap_reports_nonconvergence() {
        let a = tridiagonal(50);
        let b = vec![1.0; 50];
        let solver = ConjugateGradient::new(CgConfig {
            max_iterations: 1,
            rel_tol: 1e-14,
            abs_tol: 0.0,
        })
        .unwrap();
        let out = solver.solve(&a, &b, &[0.0; 50]).unwrap();
        assert_eq!(out.exit_code, NOT_CONVERGED);
    }

    #[test]
    fn breakdown_reports_iterations_done() {
        // negative definite: the first search direction has p.Ap < 0
        let mut coo = CooMatrix::new(3, 3);
        for i in 0..3 {
            coo.push(i, i, -1.0);
        }
        let a = CsrMatrix::from(&coo);
        let out = ConjugateGradient::default()
            .solve(&a, &[1.0; 3], &[0.0; 3])
            .unwrap();
        assert_eq!(out.exit_code, NOT_CONVERGED);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn rejects_bad_config() {
        assert!(ConjugateGradient::new(CgConfig {
            max_iterations: 0,
            ..CgConfig::default()
        })
        .is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::direct::DirectSolver;
    use nalgebra_sparse::CooMatrix;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn agrees_with_lu_on_weighted_chains(
            weights in prop::collection::vec(0.1_f64..10.0, 2..15),
            rhs_scale in -5.0_f64..5.0,
        ) {
            // Weighted chain Laplacian plus a unit shift keeps it positive definite
            let n = weights.len() + 1;
            let mut coo = CooMatrix::new(n, n);
            for i in 0..n {
                coo.push(i, i, 1.0);
            }
            for (t, &w) in weights.iter().enumerate() {
                coo.push(t, t, w);
                coo.push(t + 1, t + 1, w);
                coo.push(t, t + 1, -w);
                coo.push(t + 1, t, -w);
            }
            let a = CsrMatrix::from(&coo);
            let b: Vec<Real> = (0..n).map(|i| rhs_scale * (i as Real).sin()).collect();
            let x0 = vec![0.0; n];

            let cg = ConjugateGradient::default().solve(&a, &b, &x0).unwrap();
            let lu = DirectSolver.solve(&a, &b, &x0).unwrap();
            prop_assert!(cg.converged());
            for (u, v) in cg.x.iter().zip(&lu.x) {
                prop_assert!((u - v).abs() < 1e-6);
            }
        }
    }
}
