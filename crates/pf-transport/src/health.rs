//! Pre-solve health checks: connectivity and finiteness of `(A, b)`.
//!
//! When `A` or `b` hold NaN or infinite values, the validator walks the
//! property dependency graph of the contributing phases to name the
//! property (and owning phase) most likely at fault.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra_sparse::CsrMatrix;
use pf_core::{Real, all_finite};
use pf_network::Network;
use pf_phase::{DependencyGraph, Phase};
use pf_solver::sparse::values_finite;

use crate::error::{TransportError, TransportResult};

/// Most likely cause of non-finite values in `A` or `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnosis {
    /// Root properties of the bad values and the phases owning them.
    RootCause {
        props: Vec<String>,
        objects: Vec<String>,
    },
    /// Non-finite conductance at throats no conductance model covers.
    MissingConductanceModel {
        conductance: String,
        throats: Vec<usize>,
    },
    /// Non-finite properties that no model produces.
    Unaccounted { props: Vec<String> },
    /// Source terms whose linearization is non-finite, with the pores affected.
    NonFiniteSource { sources: BTreeMap<String, Vec<usize>> },
    /// Nothing in the phases explains the bad values.
    Undetermined,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::RootCause { props, objects } => write!(
                f,
                "Found non-finite values in the linear system, possibly caused by \
                 non-finite values in {props:?}. Run regenerate_models on {objects:?} \
                 and check that the underlying data is valid."
            ),
            Diagnosis::MissingConductanceModel {
                conductance,
                throats,
            } => write!(
                f,
                "Found non-finite values in the linear system, possibly caused by \
                 missing conductance models: '{conductance}' is non-finite at throats \
                 {throats:?}, which no model of '{conductance}' covers."
            ),
            Diagnosis::Unaccounted { props } => write!(
                f,
                "Found non-finite values in the linear system, possibly caused by \
                 non-finite values in {props:?}, which no model produces."
            ),
            Diagnosis::NonFiniteSource { sources } => write!(
                f,
                "Found non-finite values in the linear system, caused by source terms \
                 linearizing to non-finite values (source -> pores: {sources:?}). Check \
                 the source coefficients and the initial guess."
            ),
            Diagnosis::Undetermined => write!(
                f,
                "Found non-finite values in the linear system but couldn't locate the \
                 root cause. Try disabling caching on the algorithm."
            ),
        }
    }
}

/// Every connected cluster must contain a pore with a boundary condition.
pub fn validate_topology(network: &Network, anchored: &[bool]) -> TransportResult<()> {
    let unreachable = network.unanchored_pores(anchored);
    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(TransportError::Topology { unreachable })
    }
}

/// Succeed when `A` and `b` are finite; otherwise diagnose the cause.
///
/// `objects` are the phases that fed the system; `conductance` is the
/// throat property used to build `A`; `sources` maps each source term with
/// a non-finite linearization to the pores where it occurred.
pub fn validate_finiteness(
    a: &CsrMatrix<Real>,
    b: &[Real],
    objects: &[&Phase],
    conductance: &str,
    sources: &BTreeMap<String, Vec<usize>>,
) -> TransportResult<()> {
    if values_finite(a) && all_finite(b) {
        return Ok(());
    }
    Err(TransportError::NumericalHealth(diagnose(
        objects,
        conductance,
        sources,
    )))
}

/// `throat.foo.bar` -> `throat.foo`.
fn base_name(prop: &str) -> String {
    prop.splitn(3, '.').take(2).collect::<Vec<_>>().join(".")
}

/// Trace non-finite properties of `objects` back to their root cause.
///
/// Phase data is blamed first; source terms only when the phases are clean.
pub fn diagnose(
    objects: &[&Phase],
    conductance: &str,
    sources: &BTreeMap<String, Vec<usize>>,
) -> Diagnosis {
    let graph = DependencyGraph::compose_all(
        objects
            .iter()
            .map(|p| p.dependency_graph())
            .collect::<Vec<_>>()
            .iter(),
    );

    // property -> owning object
    let mut implicated: BTreeMap<String, String> = BTreeMap::new();
    let mut unaccounted: Vec<String> = Vec::new();
    for obj in objects {
        for prop in obj.unhealthy_props() {
            let base = base_name(&prop);
            if graph.contains(&base) {
                implicated.insert(base, obj.name().to_string());
            } else if !unaccounted.contains(&base) {
                unaccounted.push(base);
            }
        }
    }

    if !implicated.is_empty() {
        let names: Vec<&str> = implicated.keys().map(String::as_str).collect();
        let sub = graph.subgraph(&names);
        let props = sub.roots();
        let order = sub.topological_order().unwrap_or_else(|| sub.nodes());
        let mut owners: Vec<String> = Vec::new();
        for prop in order.iter().filter(|p| props.contains(p)) {
            if let Some(owner) = implicated.get(prop) {
                if !owners.contains(owner) {
                    owners.push(owner.clone());
                }
            }
        }
        return Diagnosis::RootCause {
            props,
            objects: owners,
        };
    }

    if let Some(throats) = uncovered_conductance(objects, conductance) {
        return Diagnosis::MissingConductanceModel {
            conductance: conductance.to_string(),
            throats,
        };
    }

    if !unaccounted.is_empty() {
        return Diagnosis::Unaccounted { props: unaccounted };
    }
    if !sources.is_empty() {
        return Diagnosis::NonFiniteSource {
            sources: sources.clone(),
        };
    }
    Diagnosis::Undetermined
}

/// Throats with non-finite conductance outside every object's model coverage.
fn uncovered_conductance(objects: &[&Phase], conductance: &str) -> Option<Vec<usize>> {
    let mut bad: Option<Vec<bool>> = None;
    let mut covered: Option<Vec<bool>> = None;
    for obj in objects {
        let Ok(values) = obj.get(conductance) else {
            continue;
        };
        let mask = values.nonfinite_mask();
        let cov = obj
            .model_coverage(conductance)
            .unwrap_or_else(|_| vec![false; mask.len()]);
        merge_or(&mut bad, &mask);
        merge_or(&mut covered, &cov);
    }
    let (bad, covered) = (bad?, covered?);
    let throats: Vec<usize> = bad
        .iter()
        .zip(&covered)
        .enumerate()
        .filter(|&(_, (&b, &c))| b && !c)
        .map(|(t, _)| t)
        .collect();
    (!throats.is_empty()).then_some(throats)
}

fn merge_or(acc: &mut Option<Vec<bool>>, mask: &[bool]) {
    match acc {
        None => *acc = Some(mask.to_vec()),
        Some(v) => v.iter_mut().zip(mask).for_each(|(a, &m)| *a |= m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_network::NetworkBuilder;
    use pf_phase::Model;

    fn network() -> Network {
        NetworkBuilder::from_conns(4, vec![[0, 1], [1, 2], [2, 3]])
            .build()
            .unwrap()
    }

    fn no_sources() -> BTreeMap<String, Vec<usize>> {
        BTreeMap::new()
    }

    fn nan_system(net: &Network) -> (CsrMatrix<Real>, Vec<Real>) {
        let a = net.laplacian(&[1.0, Real::NAN, 1.0]).unwrap();
        (a, vec![0.0; net.num_pores()])
    }

    #[test]
    fn base_name_keeps_two_segments() {
        assert_eq!(base_name("throat.g.left"), "throat.g");
        assert_eq!(base_name("pore.x"), "pore.x");
    }

    #[test]
    fn topology_lists_unreachable_pores() {
        let net = NetworkBuilder::from_conns(4, vec![[0, 1], [2, 3]])
            .build()
            .unwrap();
        let err = validate_topology(&net, &[true, false, false, false]).unwrap_err();
        match err {
            TransportError::Topology { unreachable } => assert_eq!(unreachable, vec![2, 3]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(validate_topology(&net, &[false, true, false, true]).is_ok());
    }

    #[test]
    fn finite_system_passes() {
        let net = network();
        let a = net.laplacian(&[1.0; 3]).unwrap();
        let phase = Phase::new("air", &net);
        assert!(validate_finiteness(&a, &[0.0; 4], &[&phase], "throat.g", &no_sources()).is_ok());
    }

    #[test]
    fn root_cause_is_the_upstream_property() {
        let net = network();
        let mut phase = Phase::new("air", &net);
        phase
            .set("pore.diffusivity", vec![1.0, Real::NAN, 1.0, 1.0])
            .unwrap();
        phase
            .set("throat.g", vec![1.0, Real::NAN, 1.0])
            .unwrap();
        phase
            .add_model(Model::new("pore.diffusivity").depends_on(["pore.temperature"]))
            .unwrap();
        phase
            .add_model(Model::new("throat.g").depends_on(["pore.diffusivity"]))
            .unwrap();

        let (a, b) = nan_system(&net);
        let err = validate_finiteness(&a, &b, &[&phase], "throat.g", &no_sources()).unwrap_err();
        match err {
            TransportError::NumericalHealth(Diagnosis::RootCause { props, objects }) => {
                assert_eq!(props, vec!["pore.diffusivity".to_string()]);
                assert_eq!(objects, vec!["air".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn uncovered_conductance_is_reported() {
        let net = network();
        let mut phase = Phase::new("air", &net);
        phase
            .set("throat.g", vec![1.0, Real::NAN, 1.0])
            .unwrap();
        let (a, b) = nan_system(&net);
        let err = validate_finiteness(&a, &b, &[&phase], "throat.g", &no_sources()).unwrap_err();
        assert!(err.to_string().contains("throat.g"));
        assert!(matches!(
            err,
            TransportError::NumericalHealth(Diagnosis::MissingConductanceModel { ref throats, .. })
                if throats == &vec![1]
        ));
    }

    #[test]
    fn unmodelled_bad_props_are_unaccounted() {
        let net = network();
        let mut phase = Phase::new("air", &net);
        phase.set("throat.g", vec![1.0; 3]).unwrap();
        phase
            .add_model(Model::new("throat.g").depends_on(["pore.d"]))
            .unwrap();
        phase.set("pore.junk", vec![Real::NAN; 4]).unwrap();
        assert_eq!(
            diagnose(&[&phase], "throat.g", &no_sources()),
            Diagnosis::Unaccounted {
                props: vec!["pore.junk".to_string()]
            }
        );
    }

    #[test]
    fn nothing_found_suggests_disabling_cache() {
        let net = network();
        let phase = Phase::new("air", &net);
        let (a, b) = nan_system(&net);
        let err = validate_finiteness(&a, &b, &[&phase], "throat.g", &no_sources()).unwrap_err();
        assert!(err.to_string().contains("disabling caching"));
    }

    #[test]
    fn bad_source_is_named_when_phases_are_clean() {
        let net = network();
        let phase = Phase::new("air", &net);
        let a = net.laplacian(&[1.0; 3]).unwrap();
        let b = vec![0.0, Real::INFINITY, 0.0, 0.0];
        let sources = BTreeMap::from([("reaction".to_string(), vec![1])]);
        let err = validate_finiteness(&a, &b, &[&phase], "throat.g", &sources).unwrap_err();
        assert!(err.to_string().contains("reaction"));
        assert!(!err.to_string().contains("disabling caching"));
        match err {
            TransportError::NumericalHealth(Diagnosis::NonFiniteSource { sources: found }) => {
                assert_eq!(found, sources)
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
