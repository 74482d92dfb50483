//! Transport with source terms, solved by repeated linearization.

use std::collections::{BTreeMap, BTreeSet};

use pf_core::Real;
use pf_network::Network;
use pf_phase::{Phase, Project};
use pf_solver::SolverAdapter;
use tracing::{debug, info, warn};

use crate::bc::{BcKind, BcMode};
use crate::controller::IterativeController;
use crate::error::TransportResult;
use crate::rate::{RateMode, RateTarget};
use crate::settings::{ReactiveSettings, TransportSettings};
use crate::solution::SolutionContainer;
use crate::source::SourceTerm;
use crate::transport::Transport;

/// Steady transport with (possibly non-linear) sources.
///
/// Each cycle writes `x` into the phase, regenerates the properties that
/// depend on it, re-linearizes the sources, solves and relaxes. Hitting
/// `max_iter` is not an error: the latest iterate is returned with
/// `is_converged = false`.
#[derive(Debug)]
pub struct ReactiveTransport {
    transport: Transport,
    settings: ReactiveSettings,
}

impl ReactiveTransport {
    pub fn new(network: &Network, settings: TransportSettings, reactive: ReactiveSettings) -> Self {
        Self {
            transport: Transport::new(network, settings),
            settings: reactive,
        }
    }

    pub fn settings(&self) -> &ReactiveSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ReactiveSettings {
        &mut self.settings
    }

    /// The underlying single-cycle algorithm.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    pub fn x(&self) -> &[Real] {
        self.transport.x()
    }

    pub fn soln(&self) -> &SolutionContainer {
        self.transport.soln()
    }

    pub fn set_value_bc(
        &mut self,
        pores: Option<&[usize]>,
        values: &[Real],
        mode: BcMode,
    ) -> TransportResult<()> {
        self.transport.set_bc(pores, BcKind::Value, values, mode)
    }

    pub fn set_rate_bc(
        &mut self,
        pores: Option<&[usize]>,
        rates: &[Real],
        mode: BcMode,
    ) -> TransportResult<()> {
        self.transport.set_bc(pores, BcKind::Rate, rates, mode)
    }

    /// Register `term` under `name` at `pores`, replacing any source of
    /// the same name. Fails if a pore carries a value condition.
    pub fn set_source(
        &mut self,
        name: &str,
        term: impl SourceTerm + 'static,
        pores: &[usize],
    ) -> TransportResult<()> {
        self.transport.add_source(name, Box::new(term), pores)
    }

    /// Returns false if no source of that name was registered.
    pub fn remove_source(&mut self, name: &str) -> bool {
        self.transport.remove_source(name)
    }

    pub fn source_names(&self) -> Vec<String> {
        self.transport.source_names().map(str::to_string).collect()
    }

    pub fn rate(
        &self,
        project: &Project,
        target: RateTarget<'_>,
        mode: RateMode,
    ) -> TransportResult<Vec<Real>> {
        self.transport.rate(project, target, mode)
    }

    /// Iterate until `x`, the residual and the iterative properties settle.
    pub fn run(
        &mut self,
        project: &mut Project,
        solver: &dyn SolverAdapter,
        x0: Option<&[Real]>,
    ) -> TransportResult<&SolutionContainer> {
        let controller = IterativeController::new(self.settings.clone())?;
        let quantity = self.transport.settings().quantity.clone();
        let phase_name = self.transport.settings().phase.clone();
        info!(
            quantity = %quantity,
            solver = solver.name(),
            max_iter = controller.max_iter(),
            relaxation = controller.relaxation_factor(),
            "running reactive transport"
        );

        self.transport.prepare(project, x0)?;
        let tracked = self.transport.iterative_props(project.phase(&phase_name)?);

        let mut converged = false;
        for iteration in 1..=controller.max_iter() {
            let x_old = self.transport.x().to_vec();
            let props_old = snapshot(project.phase(&phase_name)?, &tracked);

            let out = self
                .transport
                .cycle(project, solver, controller.relaxation_factor())?;

            let props_new = snapshot(project.phase(&phase_name)?, &tracked);
            let residual = self.transport.relative_residual()?;
            let report = controller.check(
                &x_old,
                self.transport.x(),
                &props_old,
                &props_new,
                residual,
                out.converged(),
            );
            // the previous solution stays visible until a cycle succeeds
            if iteration == 1 {
                self.transport.soln = SolutionContainer::default();
            }
            let x_now = self.transport.x().to_vec();
            self.transport
                .soln
                .update(&quantity, &x_now, report.converged, iteration);
            debug!(
                iteration,
                dx = report.dx,
                residual = report.residual,
                dprops = report.dprops,
                solver_converged = report.solver_converged,
                "reactive iteration"
            );
            if report.converged {
                info!(iteration, "reactive transport converged");
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = controller.max_iter(),
                "reactive transport did not converge"
            );
        }
        Ok(self.transport.soln())
    }
}

/// Flattened copy of each tracked property present on `phase`.
fn snapshot(phase: &Phase, tracked: &BTreeSet<String>) -> BTreeMap<String, Vec<Real>> {
    tracked
        .iter()
        .filter_map(|name| {
            let values = phase.get(name).ok()?;
            let flat = match values.as_scalar() {
                Some(v) => v.to_vec(),
                None => values.to_pairs().into_iter().flatten().collect(),
            };
            Some((name.clone(), flat))
        })
        .collect()
}
