//! Named property store.

use std::collections::BTreeMap;

use pf_core::Real;
use pf_network::Network;
use tracing::debug;

use crate::dependency::DependencyGraph;
use crate::error::{PhaseError, PhaseResult};
use crate::model::Model;
use crate::values::{Element, PropertyValues};

/// A phase: pore/throat property arrays plus the models that produce them.
#[derive(Debug)]
pub struct Phase {
    name: String,
    num_pores: usize,
    num_throats: usize,
    props: BTreeMap<String, PropertyValues>,
    models: BTreeMap<String, Model>,
}

impl Phase {
    /// Create an empty phase sized to `network`.
    pub fn new(name: impl Into<String>, network: &Network) -> Self {
        Self {
            name: name.into(),
            num_pores: network.num_pores(),
            num_throats: network.num_throats(),
            props: BTreeMap::new(),
            models: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_pores(&self) -> usize {
        self.num_pores
    }

    pub fn num_throats(&self) -> usize {
        self.num_throats
    }

    fn count(&self, element: Element) -> usize {
        match element {
            Element::Pore => self.num_pores,
            Element::Throat => self.num_throats,
        }
    }

    /// Store a property array, checking name, shape and length.
    pub fn set(&mut self, name: &str, values: impl Into<PropertyValues>) -> PhaseResult<()> {
        let values = values.into();
        let element = Element::of(name)?;
        if element == Element::Pore && matches!(values, PropertyValues::Paired(_)) {
            return Err(PhaseError::WrongShape {
                name: name.to_string(),
                what: "pore properties must be scalar",
            });
        }
        let expected = self.count(element);
        if values.len() != expected {
            return Err(PhaseError::LengthMismatch {
                name: name.to_string(),
                expected,
                actual: values.len(),
            });
        }
        self.props.insert(name.to_string(), values);
        Ok(())
    }

    /// Store a uniform scalar property.
    pub fn fill(&mut self, name: &str, value: Real) -> PhaseResult<()> {
        let n = self.count(Element::of(name)?);
        self.set(name, vec![value; n])
    }

    pub fn get(&self, name: &str) -> PhaseResult<&PropertyValues> {
        self.props.get(name).ok_or_else(|| PhaseError::UnknownProperty {
            phase: self.name.clone(),
            name: name.to_string(),
        })
    }

    /// Scalar view of a property; fails on paired arrays.
    pub fn get_scalar(&self, name: &str) -> PhaseResult<&[Real]> {
        self.get(name)?
            .as_scalar()
            .ok_or_else(|| PhaseError::WrongShape {
                name: name.to_string(),
                what: "expected one value per element",
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValues> {
        self.props.remove(name)
    }

    /// Property names, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    pub(crate) fn props(&self) -> &BTreeMap<String, PropertyValues> {
        &self.props
    }

    /// Register a model. Fails if it would close a dependency cycle.
    pub fn add_model(&mut self, model: Model) -> PhaseResult<()> {
        Element::of(&model.propname)?;
        let prop = model.propname.clone();
        let previous = self.models.insert(prop.clone(), model);
        if self.dependency_graph().is_cyclic() {
            match previous {
                Some(old) => self.models.insert(prop.clone(), old),
                None => self.models.remove(&prop),
            };
            return Err(PhaseError::CyclicDependency { prop });
        }
        Ok(())
    }

    pub fn model(&self, propname: &str) -> Option<&Model> {
        self.models.get(propname)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Dependency graph of every registered model.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for model in self.models.values() {
            graph.add_node(&model.propname);
            for dep in &model.dependencies {
                graph.add_edge(dep, &model.propname);
            }
        }
        graph
    }

    /// Mask of elements covered by some model of `propname`.
    pub fn model_coverage(&self, propname: &str) -> PhaseResult<Vec<bool>> {
        let n = self.count(Element::of(propname)?);
        let mut mask = vec![false; n];
        if let Some(model) = self.models.get(propname) {
            match &model.locations {
                None => mask.iter_mut().for_each(|m| *m = true),
                Some(locs) => {
                    for &i in locs.iter().filter(|&&i| i < n) {
                        mask[i] = true;
                    }
                }
            }
        }
        Ok(mask)
    }

    /// Recompute models in dependency order.
    ///
    /// With `only = Some(names)` just those models run (still in dependency
    /// order); models without a closure are skipped.
    pub fn regenerate_models<S: AsRef<str>>(&mut self, only: Option<&[S]>) -> PhaseResult<()> {
        let order = self
            .dependency_graph()
            .topological_order()
            .ok_or_else(|| PhaseError::CyclicDependency {
                prop: self.name.clone(),
            })?;

        for prop in order {
            if let Some(names) = only {
                if !names.iter().any(|n| n.as_ref() == prop) {
                    continue;
                }
            }
            let Some(model) = self.models.get(&prop) else {
                continue;
            };
            let Some(func) = model.func.as_ref() else {
                continue;
            };
            let computed = func(self)?;
            let merged = match &model.locations {
                None => computed,
                Some(locs) => self.merge_partial(&prop, computed, locs)?,
            };
            debug!(phase = %self.name, prop = %prop, "regenerated model");
            self.set(&prop, merged)?;
        }
        Ok(())
    }

    /// Write `computed` only at `locs`, keeping the rest of the stored array.
    fn merge_partial(
        &self,
        prop: &str,
        computed: PropertyValues,
        locs: &[usize],
    ) -> PhaseResult<PropertyValues> {
        let n = self.count(Element::of(prop)?);
        if computed.len() != n {
            return Err(PhaseError::LengthMismatch {
                name: prop.to_string(),
                expected: n,
                actual: computed.len(),
            });
        }
        let merged = match (self.props.get(prop), computed) {
            (Some(PropertyValues::Scalar(old)), PropertyValues::Scalar(new)) => {
                let mut out = old.clone();
                for &i in locs.iter().filter(|&&i| i < n) {
                    out[i] = new[i];
                }
                PropertyValues::Scalar(out)
            }
            (None, PropertyValues::Scalar(new)) => {
                let mut out = vec![Real::NAN; n];
                for &i in locs.iter().filter(|&&i| i < n) {
                    out[i] = new[i];
                }
                PropertyValues::Scalar(out)
            }
            (old, new) => {
                let mut out = match old {
                    Some(existing) => existing.to_pairs(),
                    None => vec![[Real::NAN; 2]; n],
                };
                let new = new.to_pairs();
                for &i in locs.iter().filter(|&&i| i < n) {
                    out[i] = new[i];
                }
                PropertyValues::Paired(out)
            }
        };
        Ok(merged)
    }
}
