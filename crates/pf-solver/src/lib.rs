//! Linear-system solvers for the transport engine.
//!
//! The engine only depends on the [`SolverAdapter`] contract:
//! `solve(A, b, x0) -> (x, exit_code)` with `exit_code == 0` meaning
//! converged. Two adapters are provided: a dense LU [`DirectSolver`] and a
//! Jacobi-preconditioned [`ConjugateGradient`] for the symmetric systems
//! produced after boundary elimination.

pub mod adapter;
pub mod cg;
pub mod choice;
pub mod direct;
pub mod error;
pub mod sparse;

pub use adapter::{SolverAdapter, SolverOutput};
pub use cg::{CgConfig, ConjugateGradient};
pub use choice::SolverChoice;
pub use direct::DirectSolver;
pub use error::{SolverError, SolverResult};
