//! Boundary-free system assembly with an explicit cache.

use std::collections::BTreeSet;

use nalgebra_sparse::CsrMatrix;
use pf_core::{Real, Tolerances};
use pf_network::{Network, reduce_directional};
use pf_phase::PropertyValues;
use tracing::debug;

use crate::error::TransportResult;

/// State of the cached boundary-free matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing built yet
    Empty,
    /// Cached matrix matches the current conductance
    Valid,
    /// A watched property changed since the last build
    Stale,
}

/// Builds the pure Laplacian `A` and a zero `b` for one quantity.
///
/// `A` is rebuilt whenever the cache is not [`CacheState::Valid`] or caching
/// is off, and is always handed out as a fresh copy so boundary conditions
/// can be applied to it without touching the cache.
#[derive(Debug, Clone)]
pub struct EquationAssembler {
    conductance: String,
    cache_enabled: bool,
    state: CacheState,
    cached: Option<CsrMatrix<Real>>,
    watched: BTreeSet<String>,
    tol: Tolerances,
}

impl EquationAssembler {
    /// Assembler for the throat property `conductance`.
    pub fn new(conductance: impl Into<String>, cache_enabled: bool) -> Self {
        let conductance = conductance.into();
        let watched = BTreeSet::from([conductance.clone()]);
        Self {
            conductance,
            cache_enabled,
            state: CacheState::Empty,
            cached: None,
            watched,
            tol: Tolerances::default(),
        }
    }

    pub fn conductance(&self) -> &str {
        &self.conductance
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
        if !enabled {
            self.invalidate();
        }
    }

    /// Add a property whose change dirties the cache.
    pub fn watch(&mut self, prop: impl Into<String>) {
        self.watched.insert(prop.into());
    }

    pub fn watched(&self) -> &BTreeSet<String> {
        &self.watched
    }

    /// Mark the cached matrix stale.
    pub fn invalidate(&mut self) {
        if self.state == CacheState::Valid {
            self.state = CacheState::Stale;
        }
    }

    /// Mark stale if any of `changed` is watched.
    pub fn notify_changed<S: AsRef<str>>(&mut self, changed: impl IntoIterator<Item = S>) {
        if changed
            .into_iter()
            .any(|p| self.watched.contains(p.as_ref()))
        {
            self.invalidate();
        }
    }

    /// Fresh copy of the boundary-free matrix.
    ///
    /// Caching is skipped for this call when the conductance itself is in
    /// `iterative_props`.
    pub fn build_a(
        &mut self,
        network: &Network,
        conductance: &PropertyValues,
        iterative_props: &BTreeSet<String>,
    ) -> TransportResult<CsrMatrix<Real>> {
        let use_cache = self.cache_enabled && !iterative_props.contains(&self.conductance);
        if use_cache && self.state == CacheState::Valid {
            if let Some(a) = &self.cached {
                return Ok(a.clone());
            }
        }

        let weights = match conductance {
            PropertyValues::Scalar(g) => g.clone(),
            PropertyValues::Paired(pairs) => reduce_directional(pairs, self.tol)?,
        };
        let a = network.laplacian(&weights)?;
        debug!(
            conductance = %self.conductance,
            nnz = a.nnz(),
            cached = use_cache,
            "rebuilt transport matrix"
        );

        if use_cache {
            self.cached = Some(a.clone());
            self.state = CacheState::Valid;
        } else {
            self.cached = None;
            self.state = CacheState::Empty;
        }
        Ok(a)
    }

    /// Fresh zero right-hand side.
    pub fn build_b(&self, num_pores: usize) -> Vec<Real> {
        vec![0.0; num_pores]
    }
}
