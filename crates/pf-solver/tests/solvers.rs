//! Solver adapters on Laplacian-like systems.

use nalgebra_sparse::{CooMatrix, CsrMatrix};
use pf_solver::{SolverAdapter, SolverChoice};

/// 1-D chain Laplacian with both ends pinned to identity rows.
fn pinned_chain(n: usize) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(n, n);
    coo.push(0, 0, 1.0);
    coo.push(n - 1, n - 1, 1.0);
    for i in 1..n - 1 {
        coo.push(i, i, 2.0);
        if i > 1 {
            coo.push(i, i - 1, -1.0);
        }
        if i + 2 < n {
            coo.push(i, i + 1, -1.0);
        }
    }
    CsrMatrix::from(&coo)
}

#[test]
fn every_choice_gives_linear_profile() {
    let n = 11;
    let a = pinned_chain(n);
    // x0 = 10, x_{n-1} = 0; symmetric elimination moves the coupling to b[1]
    let mut b = vec![0.0; n];
    b[0] = 10.0;
    b[1] = 10.0;

    for choice in [
        SolverChoice::Direct,
        SolverChoice::ConjugateGradient {
            config: Default::default(),
        },
    ] {
        let solver = choice.build().unwrap();
        let out = solver.solve(&a, &b, &vec![0.0; n]).unwrap();
        assert!(out.converged(), "{} did not converge", solver.name());
        for (i, xi) in out.x.iter().enumerate() {
            let expected = 10.0 * (1.0 - i as f64 / (n - 1) as f64);
            assert!((xi - expected).abs() < 1e-8, "{}: x[{i}] = {xi}", solver.name());
        }
    }
}

#[test]
fn choice_round_trips_through_yaml() {
    let yaml = "type: conjugate_gradient\nmax_iterations: 50\n";
    let choice: SolverChoice = serde_yaml::from_str(yaml).unwrap();
    match choice {
        SolverChoice::ConjugateGradient { config } => {
            assert_eq!(config.max_iterations, 50);
            assert_eq!(config.rel_tol, 1e-10);
        }
        other => panic!("unexpected choice {other:?}"),
    }
}
