//! Source terms linearized as `rate = S1 * x + S2`.

use nalgebra_sparse::CsrMatrix;
use pf_core::{Real, ensure_len};
use pf_phase::Phase;
use pf_solver::sparse::add_to_diagonal;

use crate::error::TransportResult;

/// Linearization of a source about the current `x`, one entry per pore.
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    /// Slope `d rate / d x`
    pub s1: Vec<Real>,
    /// Intercept
    pub s2: Vec<Real>,
    /// Rate at the current `x`
    pub rate: Vec<Real>,
}

impl Linearization {
    fn check(&self, num_pores: usize) -> TransportResult<()> {
        ensure_len(self.s1.len(), num_pores, "source S1")?;
        ensure_len(self.s2.len(), num_pores, "source S2")?;
        ensure_len(self.rate.len(), num_pores, "source rate")?;
        Ok(())
    }

    /// Pores among `pores` (skipping `fixed` ones) where `S1` or `S2` is
    /// not finite.
    pub fn nonfinite_pores(&self, pores: &[usize], fixed: &[bool]) -> Vec<usize> {
        pores
            .iter()
            .copied()
            .filter(|&p| !fixed.get(p).copied().unwrap_or(false))
            .filter(|&p| match (self.s1.get(p), self.s2.get(p)) {
                (Some(s1), Some(s2)) => !(s1.is_finite() && s2.is_finite()),
                _ => false,
            })
            .collect()
    }
}

/// A pluggable source term.
///
/// Closures of the form `Fn(&[Real], &Phase) -> TransportResult<Linearization>`
/// implement this trait too.
pub trait SourceTerm {
    fn linearize(&self, x: &[Real], phase: &Phase) -> TransportResult<Linearization>;
}

impl<F> SourceTerm for F
where
    F: Fn(&[Real], &Phase) -> TransportResult<Linearization>,
{
    fn linearize(&self, x: &[Real], phase: &Phase) -> TransportResult<Linearization> {
        self(x, phase)
    }
}

/// `rate = A1 * x + A2`, coefficients read from pore properties.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSource {
    pub a1: String,
    pub a2: String,
}

impl LinearSource {
    pub fn new(a1: impl Into<String>, a2: impl Into<String>) -> Self {
        Self {
            a1: a1.into(),
            a2: a2.into(),
        }
    }
}

impl SourceTerm for LinearSource {
    fn linearize(&self, x: &[Real], phase: &Phase) -> TransportResult<Linearization> {
        let a1 = phase.get_scalar(&self.a1)?;
        let a2 = phase.get_scalar(&self.a2)?;
        ensure_len(x.len(), a1.len(), "quantity")?;
        let rate = x
            .iter()
            .zip(a1.iter().zip(a2))
            .map(|(x, (a1, a2))| a1 * x + a2)
            .collect();
        Ok(Linearization {
            s1: a1.to_vec(),
            s2: a2.to_vec(),
            rate,
        })
    }
}

/// `rate = A1 * x^A2 + A3`, coefficients read from pore properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerLawSource {
    pub a1: String,
    pub a2: String,
    pub a3: String,
}

impl PowerLawSource {
    pub fn new(a1: impl Into<String>, a2: impl Into<String>, a3: impl Into<String>) -> Self {
        Self {
            a1: a1.into(),
            a2: a2.into(),
            a3: a3.into(),
        }
    }
}

impl SourceTerm for PowerLawSource {
    fn linearize(&self, x: &[Real], phase: &Phase) -> TransportResult<Linearization> {
        let a1 = phase.get_scalar(&self.a1)?;
        let a2 = phase.get_scalar(&self.a2)?;
        let a3 = phase.get_scalar(&self.a3)?;
        ensure_len(x.len(), a1.len(), "quantity")?;

        let n = x.len();
        let mut lin = Linearization {
            s1: Vec::with_capacity(n),
            s2: Vec::with_capacity(n),
            rate: Vec::with_capacity(n),
        };
        for i in 0..n {
            let xp = x[i].powf(a2[i]);
            lin.rate.push(a1[i] * xp + a3[i]);
            lin.s1.push(a1[i] * a2[i] * x[i].powf(a2[i] - 1.0));
            lin.s2.push(a1[i] * xp * (1.0 - a2[i]) + a3[i]);
        }
        Ok(lin)
    }
}

/// A source registered at a set of pores.
pub struct SourceEntry {
    pub term: Box<dyn SourceTerm>,
    pub pores: Vec<usize>,
}

impl std::fmt::Debug for SourceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceEntry")
            .field("pores", &self.pores)
            .finish_non_exhaustive()
    }
}

/// Add linearized sources to `(A, b)`: `A[i,i] -= S1[i]`, `b[i] += S2[i]`.
///
/// Pores flagged in `fixed` (value boundary conditions) are skipped.
pub fn apply_sources<'a>(
    a: CsrMatrix<Real>,
    mut b: Vec<Real>,
    sources: impl IntoIterator<Item = (&'a [usize], &'a Linearization)>,
    fixed: &[bool],
) -> TransportResult<(CsrMatrix<Real>, Vec<Real>)> {
    let n = b.len();
    let mut deltas = vec![0.0; n];
    for (pores, lin) in sources {
        lin.check(n)?;
        for &p in pores.iter().filter(|&&p| p < n && !fixed[p]) {
            deltas[p] -= lin.s1[p];
            b[p] += lin.s2[p];
        }
    }
    if deltas.iter().all(|&d| d == 0.0) {
        return Ok((a, b));
    }
    Ok((add_to_diagonal(&a, &deltas), b))
}
