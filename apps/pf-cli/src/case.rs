//! YAML case files: network, phase data, algorithm and boundary conditions.

use std::collections::BTreeMap;
use std::path::Path;

use pf_core::Real;
use pf_network::{NetworkBuilder, NetworkError};
use pf_phase::{PhaseError, Project};
use pf_solver::{SolverAdapter, SolverChoice};
use pf_transport::{
    BcKind, BcMode, LinearSource, PowerLawSource, Preset, ReactiveSettings, ReactiveTransport,
    SolutionContainer, Transport, TransportError, TransportSettings,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub type CaseResult<T> = Result<T, CaseError>;

#[derive(thiserror::Error, Debug)]
pub enum CaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid case: {what}")]
    Invalid { what: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Property error: {0}")]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Solver error: {0}")]
    Solver(#[from] pf_solver::SolverError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseFile {
    pub network: NetworkDef,
    pub phase: PhaseDef,
    pub algorithm: AlgorithmDef,
    #[serde(default)]
    pub solver: SolverChoice,
    #[serde(default)]
    pub boundary_conditions: Vec<BoundaryDef>,
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    /// Iterate with sources; single solve when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactive: Option<ReactiveSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_guess: Option<Vec<Real>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub num_pores: usize,
    pub conns: Vec<[usize; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseDef {
    pub name: String,
    /// `pore.*` / `throat.*` arrays; a single number fills every element
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyDef {
    Uniform(Real),
    Values(Vec<Real>),
}

/// Either a named preset or explicit settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AlgorithmDef {
    Preset { preset: Preset },
    Custom(TransportSettings),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundaryDef {
    pub kind: BcKind,
    pub pores: Vec<usize>,
    pub values: Vec<Real>,
    #[serde(default)]
    pub mode: BcMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDef {
    Linear {
        name: String,
        pores: Vec<usize>,
        a1: String,
        a2: String,
    },
    PowerLaw {
        name: String,
        pores: Vec<usize>,
        a1: String,
        a2: String,
        a3: String,
    },
}

impl CaseFile {
    pub fn from_yaml_str(s: &str) -> CaseResult<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: &Path) -> CaseResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn settings(&self) -> TransportSettings {
        match &self.algorithm {
            AlgorithmDef::Preset { preset } => preset.settings(&self.phase.name),
            AlgorithmDef::Custom(settings) => {
                let mut settings = settings.clone();
                if settings.phase.is_empty() {
                    settings.phase = self.phase.name.clone();
                }
                settings
            }
        }
    }

    /// Build the project (network + phase) described by the case.
    pub fn build_project(&self) -> CaseResult<Project> {
        let network =
            NetworkBuilder::from_conns(self.network.num_pores, self.network.conns.clone())
                .build()?;
        let mut project = Project::new(network);
        let phase = project.add_phase(&self.phase.name)?;
        for (name, def) in &self.phase.properties {
            match def {
                PropertyDef::Uniform(v) => phase.fill(name, *v)?,
                PropertyDef::Values(v) => phase.set(name, v.clone())?,
            }
            debug!(prop = %name, "loaded property");
        }
        Ok(project)
    }

    /// Build the algorithm with its boundary conditions and sources.
    ///
    /// A `reactive` block selects the iterative controller; without one the
    /// case is a single steady solve and may not declare sources.
    pub fn build_algorithm(&self, project: &Project) -> CaseResult<Algorithm> {
        let settings = self.settings();
        let Some(reactive) = &self.reactive else {
            if !self.sources.is_empty() {
                return Err(CaseError::Invalid {
                    what: "sources need a 'reactive' block".to_string(),
                });
            }
            let mut alg = Transport::new(project.network(), settings);
            for bc in &self.boundary_conditions {
                alg.set_bc(Some(bc.pores.as_slice()), bc.kind, &bc.values, bc.mode)?;
            }
            return Ok(Algorithm::Steady(alg));
        };

        let mut alg = ReactiveTransport::new(project.network(), settings, reactive.clone());
        for bc in &self.boundary_conditions {
            alg.transport_mut()
                .set_bc(Some(bc.pores.as_slice()), bc.kind, &bc.values, bc.mode)?;
        }
        for source in &self.sources {
            match source {
                SourceDef::Linear { name, pores, a1, a2 } => {
                    alg.set_source(name, LinearSource::new(a1, a2), pores)?
                }
                SourceDef::PowerLaw {
                    name,
                    pores,
                    a1,
                    a2,
                    a3,
                } => alg.set_source(name, PowerLawSource::new(a1, a2, a3), pores)?,
            }
        }
        Ok(Algorithm::Reactive(alg))
    }
}

/// The algorithm a case runs.
#[derive(Debug)]
pub enum Algorithm {
    Steady(Transport),
    Reactive(ReactiveTransport),
}

impl Algorithm {
    pub fn transport(&self) -> &Transport {
        match self {
            Algorithm::Steady(t) => t,
            Algorithm::Reactive(r) => r.transport(),
        }
    }

    pub fn run(
        &mut self,
        project: &mut Project,
        solver: &dyn SolverAdapter,
        x0: Option<&[Real]>,
    ) -> CaseResult<SolutionContainer> {
        let soln = match self {
            Algorithm::Steady(t) => t.run(project, solver, x0)?,
            Algorithm::Reactive(r) => r.run(project, solver, x0)?,
        };
        Ok(soln.clone())
    }
}
