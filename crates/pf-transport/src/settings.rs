//! Algorithm settings, presets and YAML loading.

use std::collections::BTreeSet;

use pf_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// Settings shared by every transport algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Name of the phase holding the conductance
    pub phase: String,
    /// Pore property solved for, e.g. `pore.concentration`
    pub quantity: String,
    /// Throat conductance property, e.g. `throat.diffusive_conductance`
    pub conductance: String,
    /// Reuse the boundary-free matrix between assemblies
    pub cache: bool,
    /// Extra properties regenerated on every reactive cycle
    pub variable_props: BTreeSet<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            phase: String::new(),
            quantity: String::new(),
            conductance: String::new(),
            cache: true,
            variable_props: BTreeSet::new(),
        }
    }
}

impl TransportSettings {
    pub fn new(
        phase: impl Into<String>,
        quantity: impl Into<String>,
        conductance: impl Into<String>,
    ) -> Self {
        Self {
            phase: phase.into(),
            quantity: quantity.into(),
            conductance: conductance.into(),
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_variable_props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variable_props.extend(props.into_iter().map(Into::into));
        self
    }

    /// Check that the required names are present and well formed.
    pub fn validate(&self) -> TransportResult<()> {
        if self.phase.is_empty() {
            return Err(TransportError::config("phase is not set"));
        }
        if self.quantity.is_empty() {
            return Err(TransportError::config("quantity is not set"));
        }
        if self.conductance.is_empty() {
            return Err(TransportError::config("conductance is not set"));
        }
        if !self.quantity.starts_with("pore.") {
            return Err(TransportError::config(format!(
                "quantity '{}' must be a pore property",
                self.quantity
            )));
        }
        if !self.conductance.starts_with("throat.") {
            return Err(TransportError::config(format!(
                "conductance '{}' must be a throat property",
                self.conductance
            )));
        }
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> TransportResult<Self> {
        serde_yaml::from_str(s).map_err(|e| TransportError::config(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> TransportResult<String> {
        serde_yaml::to_string(self).map_err(|e| TransportError::config(e.to_string()))
    }
}

/// Named physics presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    FickianDiffusion,
    FourierConduction,
    OhmicConduction,
    StokesFlow,
    /// Potential transport with caching off. No charge-conservation
    /// source is attached: register one with
    /// [`ReactiveTransport::set_source`](crate::ReactiveTransport::set_source)
    /// at the free pores.
    IonicConduction,
}

impl Preset {
    /// `(quantity, conductance)` property names.
    pub fn names(&self) -> (&'static str, &'static str) {
        match self {
            Preset::FickianDiffusion => ("pore.concentration", "throat.diffusive_conductance"),
            Preset::FourierConduction => ("pore.temperature", "throat.thermal_conductance"),
            Preset::OhmicConduction => ("pore.voltage", "throat.electrical_conductance"),
            Preset::StokesFlow => ("pore.pressure", "throat.hydraulic_conductance"),
            Preset::IonicConduction => ("pore.potential", "throat.ionic_conductance"),
        }
    }

    /// Settings for this preset acting on `phase`.
    pub fn settings(&self, phase: impl Into<String>) -> TransportSettings {
        let (quantity, conductance) = self.names();
        let settings = TransportSettings::new(phase, quantity, conductance);
        match self {
            // conductance depends on the potential field
            Preset::IonicConduction => settings.with_cache(false),
            _ => settings,
        }
    }
}

/// Settings for the iterative (reactive) controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveSettings {
    /// Under-relaxation weight in `(0, 1]`
    pub relaxation_factor: Real,
    /// Maximum number of assemble/solve cycles
    pub max_iter: usize,
    /// Relative tolerance on the change in `x` and in iterative properties
    pub x_rtol: Real,
    /// Relative tolerance on the residual `|A x - b| / |b|`
    pub f_rtol: Real,
}

impl Default for ReactiveSettings {
    fn default() -> Self {
        Self {
            relaxation_factor: 1.0,
            max_iter: 5000,
            x_rtol: 1e-6,
            f_rtol: 1e-6,
        }
    }
}

impl ReactiveSettings {
    pub fn validate(&self) -> TransportResult<()> {
        let w = self.relaxation_factor;
        if !(w.is_finite() && w > 0.0 && w <= 1.0) {
            return Err(TransportError::config(format!(
                "relaxation_factor must lie in (0, 1], got {w}"
            )));
        }
        if self.max_iter == 0 {
            return Err(TransportError::config("max_iter must be at least 1"));
        }
        for (name, tol) in [("x_rtol", self.x_rtol), ("f_rtol", self.f_rtol)] {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(TransportError::config(format!(
                    "{name} must be positive and finite, got {tol}"
                )));
            }
        }
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> TransportResult<Self> {
        serde_yaml::from_str(s).map_err(|e| TransportError::config(e.to_string()))
    }
}
