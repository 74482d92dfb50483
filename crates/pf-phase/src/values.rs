//! Property arrays.

use pf_core::Real;

use crate::error::{PhaseError, PhaseResult};

/// Network element a property is defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Pore,
    Throat,
}

impl Element {
    /// Element implied by a `pore.*` / `throat.*` property name.
    pub fn of(name: &str) -> PhaseResult<Self> {
        if name.starts_with("pore.") {
            Ok(Element::Pore)
        } else if name.starts_with("throat.") {
            Ok(Element::Throat)
        } else {
            Err(PhaseError::InvalidName {
                name: name.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Pore => "pore",
            Element::Throat => "throat",
        }
    }
}

/// One property array: a scalar per element, or a directional pair per throat.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValues {
    Scalar(Vec<Real>),
    Paired(Vec<[Real; 2]>),
}

impl PropertyValues {
    /// Number of elements (rows).
    pub fn len(&self) -> usize {
        match self {
            PropertyValues::Scalar(v) => v.len(),
            PropertyValues::Paired(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scalar view, if this is a scalar array.
    pub fn as_scalar(&self) -> Option<&[Real]> {
        match self {
            PropertyValues::Scalar(v) => Some(v),
            PropertyValues::Paired(_) => None,
        }
    }

    /// Per-element flag: true where any entry of the row is non-finite.
    pub fn nonfinite_mask(&self) -> Vec<bool> {
        match self {
            PropertyValues::Scalar(v) => v.iter().map(|x| !x.is_finite()).collect(),
            PropertyValues::Paired(v) => v
                .iter()
                .map(|[a, b]| !a.is_finite() || !b.is_finite())
                .collect(),
        }
    }

    /// Number of rows holding a non-finite entry.
    pub fn nonfinite_count(&self) -> usize {
        self.nonfinite_mask().into_iter().filter(|&bad| bad).count()
    }

    /// Directional pairs; scalar arrays are tiled to both directions.
    pub fn to_pairs(&self) -> Vec<[Real; 2]> {
        match self {
            PropertyValues::Scalar(v) => v.iter().map(|&x| [x, x]).collect(),
            PropertyValues::Paired(v) => v.clone(),
        }
    }
}

impl From<Vec<Real>> for PropertyValues {
    fn from(values: Vec<Real>) -> Self {
        PropertyValues::Scalar(values)
    }
}

impl From<Vec<[Real; 2]>> for PropertyValues {
    fn from(values: Vec<[Real; 2]>) -> Self {
        PropertyValues::Paired(values)
    }
}
