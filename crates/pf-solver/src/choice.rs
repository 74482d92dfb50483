//! Solver selection.

use serde::{Deserialize, Serialize};

use crate::adapter::SolverAdapter;
use crate::cg::{CgConfig, ConjugateGradient};
use crate::direct::DirectSolver;
use crate::error::SolverResult;

/// Configurable choice of linear solver.
///
/// Stands in for a process-wide default: callers pass a choice explicitly,
/// and `SolverChoice::default()` is the documented fallback (`Direct`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolverChoice {
    #[default]
    Direct,
    ConjugateGradient {
        #[serde(flatten)]
        config: CgConfig,
    },
}

impl SolverChoice {
    /// Instantiate the chosen adapter.
    pub fn build(&self) -> SolverResult<Box<dyn SolverAdapter>> {
        Ok(match self {
            SolverChoice::Direct => Box::new(DirectSolver),
            SolverChoice::ConjugateGradient { config } => {
                Box::new(ConjugateGradient::new(*config)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_direct() {
        let solver = SolverChoice::default().build().unwrap();
        assert_eq!(solver.name(), "direct-lu");
    }

    #[test]
    fn builds_configured_cg() {
        let choice = SolverChoice::ConjugateGradient {
            config: CgConfig {
                max_iterations: 5,
                ..CgConfig::default()
            },
        };
        assert_eq!(choice.build().unwrap().name(), "conjugate-gradient");
    }
}
