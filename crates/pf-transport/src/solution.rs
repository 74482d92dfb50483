//! Solution container keyed by quantity name.

use std::collections::BTreeMap;

use pf_core::Real;
use serde::Serialize;

/// Latest values of one solved quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub values: Vec<Real>,
    pub is_converged: bool,
    /// Assemble/solve cycles performed
    pub iterations: usize,
}

/// `quantity -> solution`, created once per run and updated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SolutionContainer {
    solutions: BTreeMap<String, Solution>,
}

impl SolutionContainer {
    /// Container holding `initial` for `quantity`, not yet converged.
    pub fn new(quantity: &str, initial: Vec<Real>) -> Self {
        let mut solutions = BTreeMap::new();
        solutions.insert(
            quantity.to_string(),
            Solution {
                values: initial,
                is_converged: false,
                iterations: 0,
            },
        );
        Self { solutions }
    }

    pub fn get(&self, quantity: &str) -> Option<&Solution> {
        self.solutions.get(quantity)
    }

    /// Overwrite the values and status of `quantity`.
    pub fn update(&mut self, quantity: &str, values: &[Real], is_converged: bool, iterations: usize) {
        let entry = self
            .solutions
            .entry(quantity.to_string())
            .or_insert_with(|| Solution {
                values: Vec::new(),
                is_converged: false,
                iterations: 0,
            });
        entry.values.clear();
        entry.values.extend_from_slice(values);
        entry.is_converged = is_converged;
        entry.iterations = iterations;
    }

    /// True when every stored quantity converged.
    pub fn is_converged(&self) -> bool {
        self.solutions.values().all(|s| s.is_converged)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Solution)> {
        self.solutions.iter().map(|(k, v)| (k.as_str(), v))
    }
}
