//! Property models: how a property is computed and what it reads.

use crate::error::PhaseResult;
use crate::phase::Phase;
use crate::values::PropertyValues;

/// Regeneration closure: computes the full property array from the phase.
pub type ModelFn = Box<dyn Fn(&Phase) -> PhaseResult<PropertyValues>>;

/// A registered property model.
///
/// `locations` restricts the model to a subset of elements; `None` means the
/// model covers every pore (or throat) of the phase. A model without a
/// closure only records provenance, which is all the diagnostics need.
pub struct Model {
    pub propname: String,
    pub dependencies: Vec<String>,
    pub locations: Option<Vec<usize>>,
    pub(crate) func: Option<ModelFn>,
}

impl Model {
    pub fn new(propname: impl Into<String>) -> Self {
        Self {
            propname: propname.into(),
            dependencies: Vec::new(),
            locations: None,
            func: None,
        }
    }

    /// Properties this model reads.
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Restrict the model to the given element indices.
    pub fn at_locations(mut self, locations: Vec<usize>) -> Self {
        self.locations = Some(locations);
        self
    }

    pub fn with_fn<F>(mut self, func: F) -> Self
    where
        F: Fn(&Phase) -> PhaseResult<PropertyValues> + 'static,
    {
        self.func = Some(Box::new(func));
        self
    }

    /// True when the model can recompute its property.
    pub fn is_regenerable(&self) -> bool {
        self.func.is_some()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("propname", &self.propname)
            .field("dependencies", &self.dependencies)
            .field("locations", &self.locations)
            .field("regenerable", &self.is_regenerable())
            .finish()
    }
}
