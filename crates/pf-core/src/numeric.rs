use crate::CoreError;

/// Floating point type used throughout the engine
pub type Real = f64;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite {
            what: what.to_string(),
            index: 0,
            value: v,
        })
    }
}

/// Fails on the first non-finite entry of `values`.
pub fn ensure_all_finite(values: &[Real], what: &str) -> Result<(), CoreError> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(index) => Err(CoreError::NonFinite {
            what: what.to_string(),
            index,
            value: values[index],
        }),
    }
}

pub fn ensure_len(actual: usize, expected: usize, what: &str) -> Result<(), CoreError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CoreError::LengthMismatch {
            what: what.to_string(),
            expected,
            actual,
        })
    }
}

pub fn ensure_index(index: usize, len: usize, what: &str) -> Result<usize, CoreError> {
    if index < len {
        Ok(index)
    } else {
        Err(CoreError::IndexOob {
            what: what.to_string(),
            index,
            len,
        })
    }
}

pub fn all_finite(values: &[Real]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Euclidean norm.
pub fn norm(values: &[Real]) -> Real {
    values.iter().map(|v| v * v).sum::<Real>().sqrt()
}

/// `|new - old| / |new|`, falling back to the absolute change when `new` is zero.
pub fn relative_change(new: &[Real], old: &[Real]) -> Real {
    let diff = new
        .iter()
        .zip(old)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<Real>()
        .sqrt();
    let scale = norm(new);
    if scale > 0.0 { diff / scale } else { diff }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn relative_change_is_zero_for_identical_fields(v in prop::collection::vec(-1e6_f64..1e6_f64, 1..20)) {
            prop_assert_eq!(relative_change(&v, &v), 0.0);
        }
    }
}
