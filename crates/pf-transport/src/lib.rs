//! pf-transport: steady-state transport algorithms on pore networks.
//!
//! A transport algorithm assembles `A x = b` for one pore quantity:
//! `A` is the Laplacian of a throat conductance, boundary conditions are
//! injected into `(A, b)`, optional source terms are linearized onto the
//! diagonal and right-hand side, and the system is handed to a
//! [`pf_solver::SolverAdapter`].
//!
//! - [`Transport`] solves once.
//! - [`ReactiveTransport`] re-linearizes sources and regenerates
//!   `x`-dependent properties until the iteration settles.
//!
//! Before each solve the system is checked for disconnected clusters and
//! for non-finite values; the latter are traced back through the phase's
//! model dependency graph (see [`health`]).

pub mod assembler;
pub mod bc;
pub mod controller;
pub mod error;
pub mod health;
pub mod rate;
pub mod reactive;
pub mod settings;
pub mod solution;
pub mod source;
pub mod transport;

pub use assembler::{CacheState, EquationAssembler};
pub use bc::{BcKind, BcMode, BoundaryConditions, apply_boundary_conditions};
pub use controller::{ConvergenceReport, IterativeController};
pub use error::{TransportError, TransportResult};
pub use health::Diagnosis;
pub use rate::{RateMode, RateTarget};
pub use reactive::ReactiveTransport;
pub use settings::{Preset, ReactiveSettings, TransportSettings};
pub use solution::{Solution, SolutionContainer};
pub use source::{Linearization, LinearSource, PowerLawSource, SourceTerm};
pub use transport::Transport;
