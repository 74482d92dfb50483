//! Steady-state transport of one quantity through a pore network.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra_sparse::CsrMatrix;
use pf_core::{Real, ensure_all_finite, ensure_index, ensure_len, norm};
use pf_network::Network;
use pf_phase::{Phase, Project};
use pf_solver::SolverAdapter;
use pf_solver::SolverOutput;
use pf_solver::sparse::matvec;
use tracing::{debug, info};

use crate::assembler::{CacheState, EquationAssembler};
use crate::bc::{BcKind, BcMode, BoundaryConditions, apply_boundary_conditions};
use crate::controller::relax;
use crate::error::{TransportError, TransportResult};
use crate::health::{validate_finiteness, validate_topology};
use crate::rate::{RateMode, RateTarget, rate};
use crate::settings::TransportSettings;
use crate::solution::SolutionContainer;
use crate::source::{SourceEntry, SourceTerm, apply_sources};

/// Solves `A x = b` for one quantity, where `A` is the conductance
/// Laplacian with boundary conditions (and optional sources) applied.
///
/// # Example
///
/// ```
/// use pf_network::NetworkBuilder;
/// use pf_phase::Project;
/// use pf_solver::SolverChoice;
/// use pf_transport::{BcMode, Preset, Transport};
///
/// let net = NetworkBuilder::from_conns(3, vec![[0, 1], [1, 2]]).build().unwrap();
/// let mut project = Project::new(net);
/// project
///     .add_phase("air")
///     .unwrap()
///     .fill("throat.diffusive_conductance", 2.0)
///     .unwrap();
///
/// let settings = Preset::FickianDiffusion.settings("air");
/// let mut fd = Transport::new(project.network(), settings);
/// fd.set_value_bc(Some(&[0, 2]), &[10.0, 0.0], BcMode::Add).unwrap();
///
/// let solver = SolverChoice::default().build().unwrap();
/// let soln = fd.run(&mut project, solver.as_ref(), None).unwrap();
/// let c = &soln.get("pore.concentration").unwrap().values;
/// assert!((c[1] - 5.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct Transport {
    settings: TransportSettings,
    num_pores: usize,
    bcs: BoundaryConditions,
    sources: BTreeMap<String, SourceEntry>,
    /// Sources whose last linearization was non-finite, with the pores
    unhealthy_sources: BTreeMap<String, Vec<usize>>,
    assembler: EquationAssembler,
    a: Option<CsrMatrix<Real>>,
    b: Option<Vec<Real>>,
    x: Vec<Real>,
    pub(crate) soln: SolutionContainer,
}

impl Transport {
    pub fn new(network: &Network, settings: TransportSettings) -> Self {
        let num_pores = network.num_pores();
        let assembler = EquationAssembler::new(settings.conductance.clone(), settings.cache);
        Self {
            settings,
            num_pores,
            bcs: BoundaryConditions::new(num_pores),
            sources: BTreeMap::new(),
            unhealthy_sources: BTreeMap::new(),
            assembler,
            a: None,
            b: None,
            x: vec![0.0; num_pores],
            soln: SolutionContainer::default(),
        }
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    pub fn num_pores(&self) -> usize {
        self.num_pores
    }

    /// Current quantity field.
    pub fn x(&self) -> &[Real] {
        &self.x
    }

    /// System matrix with boundary conditions applied, once assembled.
    pub fn a(&self) -> Option<&CsrMatrix<Real>> {
        self.a.as_ref()
    }

    pub fn b(&self) -> Option<&[Real]> {
        self.b.as_deref()
    }

    /// Solution of the last successful run.
    pub fn soln(&self) -> &SolutionContainer {
        &self.soln
    }

    pub fn bcs(&self) -> &BoundaryConditions {
        &self.bcs
    }

    pub fn cache_state(&self) -> CacheState {
        self.assembler.state()
    }

    pub fn set_cache(&mut self, enabled: bool) {
        self.settings.cache = enabled;
        self.assembler.set_cache_enabled(enabled);
    }

    /// Tell the cache that `props` changed outside the algorithm.
    pub fn notify_changed<S: AsRef<str>>(&mut self, props: impl IntoIterator<Item = S>) {
        self.assembler.notify_changed(props);
    }

    // -- boundary conditions ------------------------------------------------

    pub fn set_value_bc(
        &mut self,
        pores: Option<&[usize]>,
        values: &[Real],
        mode: BcMode,
    ) -> TransportResult<()> {
        self.set_bc(pores, BcKind::Value, values, mode)
    }

    pub fn set_rate_bc(
        &mut self,
        pores: Option<&[usize]>,
        rates: &[Real],
        mode: BcMode,
    ) -> TransportResult<()> {
        self.set_bc(pores, BcKind::Rate, rates, mode)
    }

    /// Register boundary conditions of `kind` at `pores` (`None` = all).
    ///
    /// Value conditions may not land on pores holding a source term.
    pub fn set_bc(
        &mut self,
        pores: Option<&[usize]>,
        kind: BcKind,
        values: &[Real],
        mode: BcMode,
    ) -> TransportResult<()> {
        if kind == BcKind::Value && mode != BcMode::Remove {
            let targets: Vec<usize> = match pores {
                Some(p) => p.to_vec(),
                None => (0..self.num_pores).collect(),
            };
            let clash: Vec<usize> = targets
                .into_iter()
                .filter(|p| self.sources.values().any(|s| s.pores.contains(p)))
                .collect();
            if !clash.is_empty() {
                return Err(TransportError::input(format!(
                    "pores {clash:?} hold source terms and cannot take value conditions"
                )));
            }
        }
        self.bcs.set(kind, pores, values, mode)?;
        debug!(?kind, ?mode, quantity = %self.settings.quantity, "boundary conditions updated");
        Ok(())
    }

    pub fn clear_value_bcs(&mut self) {
        self.bcs.clear(BcKind::Value);
    }

    pub fn clear_rate_bcs(&mut self) {
        self.bcs.clear(BcKind::Rate);
    }

    // -- sources ------------------------------------------------------------

    pub(crate) fn add_source(
        &mut self,
        name: &str,
        term: Box<dyn SourceTerm>,
        pores: &[usize],
    ) -> TransportResult<()> {
        let pores: Vec<usize> = pores
            .iter()
            .map(|&p| ensure_index(p, self.num_pores, "source pore"))
            .collect::<Result<_, _>>()?;
        let fixed = self.bcs.mask(BcKind::Value);
        let clash: Vec<usize> = pores.iter().copied().filter(|&p| fixed[p]).collect();
        if !clash.is_empty() {
            return Err(TransportError::input(format!(
                "source '{name}' overlaps value conditions at pores {clash:?}"
            )));
        }
        self.sources
            .insert(name.to_string(), SourceEntry { term, pores });
        Ok(())
    }

    pub(crate) fn remove_source(&mut self, name: &str) -> bool {
        self.sources.remove(name).is_some()
    }

    pub(crate) fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    // -- assembly -----------------------------------------------------------

    /// Properties regenerated from `x` before each assembly: the variable
    /// properties plus everything downstream of them or of the quantity.
    pub fn iterative_props(&self, phase: &Phase) -> BTreeSet<String> {
        let graph = phase.dependency_graph();
        let mut props = self.settings.variable_props.clone();
        let mut base: Vec<&str> = props.iter().map(String::as_str).collect();
        base.push(&self.settings.quantity);
        let downstream: BTreeSet<String> = base
            .into_iter()
            .flat_map(|p| graph.descendants(p))
            .collect();
        props.extend(downstream);
        props.remove(&self.settings.quantity);
        props
    }

    /// Write `x` to the phase and regenerate the iterative properties.
    fn refresh_iterative_props(&mut self, project: &mut Project) -> TransportResult<BTreeSet<String>> {
        let phase = project.phase_mut(&self.settings.phase)?;
        let iterative = self.iterative_props(phase);
        if iterative.is_empty() {
            return Ok(iterative);
        }
        phase.set(&self.settings.quantity, self.x.clone())?;
        let names: Vec<&str> = iterative.iter().map(String::as_str).collect();
        phase.regenerate_models(Some(&names[..]))?;
        self.assembler.notify_changed(&iterative);
        Ok(iterative)
    }

    /// Rebuild `A` and `b` from the current `x`.
    pub fn update_a_and_b(&mut self, project: &mut Project) -> TransportResult<()> {
        let iterative = self.refresh_iterative_props(project)?;
        let network = project.network();
        let phase = project.phase(&self.settings.phase)?;
        let g = phase.get(&self.settings.conductance).map_err(|_| {
            TransportError::config(format!(
                "conductance '{}' not found on phase '{}'",
                self.settings.conductance,
                phase.name()
            ))
        })?;

        let a = self.assembler.build_a(network, g, &iterative)?;
        let b = self.assembler.build_b(self.num_pores);
        let (a, b) = apply_boundary_conditions(a, b, &self.bcs);

        let mut unhealthy = BTreeMap::new();
        let (a, b) = if self.sources.is_empty() {
            (a, b)
        } else {
            let lins = self
                .sources
                .iter()
                .map(|(name, s)| {
                    let lin = s.term.linearize(&self.x, phase)?;
                    Ok((name, s.pores.as_slice(), lin))
                })
                .collect::<TransportResult<Vec<_>>>()?;
            let fixed = self.bcs.mask(BcKind::Value);
            for (name, pores, lin) in &lins {
                let bad = lin.nonfinite_pores(pores, &fixed);
                if !bad.is_empty() {
                    unhealthy.insert(name.to_string(), bad);
                }
            }
            apply_sources(a, b, lins.iter().map(|(_, p, l)| (*p, l)), &fixed)?
        };

        self.unhealthy_sources = unhealthy;
        self.a = Some(a);
        self.b = Some(b);
        Ok(())
    }

    // -- validation ---------------------------------------------------------

    pub fn validate_settings(&self, project: &Project) -> TransportResult<()> {
        self.settings.validate()?;
        if project.phase(&self.settings.phase).is_err() {
            return Err(TransportError::config(format!(
                "phase '{}' not found in project",
                self.settings.phase
            )));
        }
        ensure_len(project.network().num_pores(), self.num_pores, "network pores")?;
        Ok(())
    }

    pub fn validate_topology(&self, project: &Project) -> TransportResult<()> {
        validate_topology(project.network(), &self.bcs.any_mask())
    }

    /// Check the assembled system for non-finite values.
    pub fn validate_data_health(&self, project: &Project) -> TransportResult<()> {
        let (a, b) = self.system()?;
        let phase = project.phase(&self.settings.phase)?;
        validate_finiteness(
            a,
            b,
            &[phase],
            &self.settings.conductance,
            &self.unhealthy_sources,
        )
    }

    fn system(&self) -> TransportResult<(&CsrMatrix<Real>, &[Real])> {
        match (&self.a, &self.b) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(TransportError::NotAssembled),
        }
    }

    // -- solving ------------------------------------------------------------

    /// Validate inputs, install `x0` and assemble the first system.
    pub(crate) fn prepare(&mut self, project: &mut Project, x0: Option<&[Real]>) -> TransportResult<()> {
        self.validate_settings(project)?;
        self.validate_topology(project)?;
        let x0 = match x0 {
            Some(x0) => {
                ensure_len(x0.len(), self.num_pores, "initial guess")?;
                ensure_all_finite(x0, "initial guess")?;
                x0.to_vec()
            }
            None => vec![0.0; self.num_pores],
        };
        self.x = x0;
        self.update_a_and_b(project)
    }

    /// One cycle: health check, solve, relax, reassemble.
    pub(crate) fn cycle(
        &mut self,
        project: &mut Project,
        solver: &dyn SolverAdapter,
        w: Real,
    ) -> TransportResult<SolverOutput> {
        self.validate_data_health(project)?;
        let (a, b) = self.system()?;
        let out = solver.solve(a, b, &self.x)?;
        ensure_len(out.x.len(), self.num_pores, "solver output")?;
        relax(&mut self.x, &out.x, w);
        self.update_a_and_b(project)?;
        Ok(out)
    }

    /// Solve once. The result is converged iff the solver reports exit code 0.
    pub fn run(
        &mut self,
        project: &mut Project,
        solver: &dyn SolverAdapter,
        x0: Option<&[Real]>,
    ) -> TransportResult<&SolutionContainer> {
        info!(
            quantity = %self.settings.quantity,
            solver = solver.name(),
            "running steady transport"
        );
        self.prepare(project, x0)?;
        let out = self.cycle(project, solver, 1.0)?;

        let mut soln = SolutionContainer::new(&self.settings.quantity, Vec::new());
        soln.update(&self.settings.quantity, &self.x, out.converged(), 1);
        self.soln = soln;
        info!(
            quantity = %self.settings.quantity,
            converged = out.converged(),
            iterations = out.iterations,
            "steady transport finished"
        );
        Ok(&self.soln)
    }

    // -- post-processing ----------------------------------------------------

    /// `A x - b` for the current state.
    pub fn residual(&self) -> TransportResult<Vec<Real>> {
        let (a, b) = self.system()?;
        let mut r = matvec(a, &self.x);
        for (ri, bi) in r.iter_mut().zip(b) {
            *ri -= bi;
        }
        Ok(r)
    }

    /// `|A x - b| / |b|`, or the absolute norm when `b` is zero.
    pub fn relative_residual(&self) -> TransportResult<Real> {
        let r = norm(&self.residual()?);
        let scale = norm(self.system()?.1);
        Ok(if scale > 0.0 { r / scale } else { r })
    }

    /// Net rate through `target` for the current `x`.
    pub fn rate(
        &self,
        project: &Project,
        target: RateTarget<'_>,
        mode: RateMode,
    ) -> TransportResult<Vec<Real>> {
        let phase = project.phase(&self.settings.phase)?;
        let g = phase.get(&self.settings.conductance)?;
        rate(project.network(), &self.x, g, target, mode)
    }
}
