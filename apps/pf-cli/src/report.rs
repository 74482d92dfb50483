//! Run summaries printed by the CLI.

use pf_core::Real;
use pf_phase::Project;
use pf_transport::{BcKind, RateMode, RateTarget, SolutionContainer, Transport};
use serde::Serialize;

use crate::case::CaseResult;

#[derive(Debug, Clone, Serialize)]
pub struct BoundaryRate {
    pub pore: usize,
    pub kind: BcKind,
    pub rate: Real,
}

/// Solution plus the net rate at every boundary pore.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub quantity: String,
    pub is_converged: bool,
    pub iterations: usize,
    pub values: Vec<Real>,
    pub boundary_rates: Vec<BoundaryRate>,
}

impl RunReport {
    pub fn new(alg: &Transport, project: &Project, soln: &SolutionContainer) -> CaseResult<Self> {
        let quantity = alg.settings().quantity.clone();
        let (values, is_converged, iterations) = match soln.get(&quantity) {
            Some(s) => (s.values.clone(), s.is_converged, s.iterations),
            None => (alg.x().to_vec(), false, 0),
        };

        let mut boundary_rates = Vec::new();
        for kind in [BcKind::Value, BcKind::Rate] {
            for pore in alg.bcs().pores(kind) {
                let rate = alg.rate(project, RateTarget::Pores(&[pore]), RateMode::Group)?;
                boundary_rates.push(BoundaryRate {
                    pore,
                    kind,
                    rate: rate[0],
                });
            }
        }
        boundary_rates.sort_by_key(|r| r.pore);

        Ok(Self {
            quantity,
            is_converged,
            iterations,
            values,
            boundary_rates,
        })
    }

    pub fn to_json(&self) -> CaseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_table(&self) -> String {
        let mut out = String::new();
        let status = if self.is_converged {
            "converged"
        } else {
            "NOT converged"
        };
        out.push_str(&format!(
            "{} ({}, {} iteration(s))\n",
            self.quantity, status, self.iterations
        ));
        out.push_str(&format!("{:>6}  {:>16}\n", "pore", "value"));
        for (p, v) in self.values.iter().enumerate() {
            out.push_str(&format!("{p:>6}  {v:>16.8e}\n"));
        }
        if !self.boundary_rates.is_empty() {
            out.push_str(&format!("\n{:>6}  {:>6}  {:>16}\n", "pore", "bc", "net rate"));
            for r in &self.boundary_rates {
                let kind = match r.kind {
                    BcKind::Value => "value",
                    BcKind::Rate => "rate",
                };
                out.push_str(&format!("{:>6}  {:>6}  {:>16.8e}\n", r.pore, kind, r.rate));
            }
        }
        out
    }
}
