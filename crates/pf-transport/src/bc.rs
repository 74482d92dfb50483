//! Boundary conditions: registration and injection into `(A, b)`.

use nalgebra_sparse::CsrMatrix;
use pf_core::{Real, ensure_index};
use pf_solver::sparse::{add_to_diagonal, drop_zeros, matvec, mean_diagonal};
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// Kind of boundary condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcKind {
    /// Fixed value (Dirichlet)
    Value,
    /// Fixed net rate (Neumann)
    Rate,
}

/// How a registration treats pores that already carry a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcMode {
    /// Refuse pores that already carry a condition of either kind
    #[default]
    Add,
    /// Replace whatever the pores carry
    Overwrite,
    /// Clear this kind at the pores
    Remove,
}

/// Per-pore value and rate conditions; NaN marks "unset".
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConditions {
    value: Vec<Real>,
    rate: Vec<Real>,
}

impl BoundaryConditions {
    /// No conditions on `num_pores` pores.
    pub fn new(num_pores: usize) -> Self {
        Self {
            value: vec![Real::NAN; num_pores],
            rate: vec![Real::NAN; num_pores],
        }
    }

    /// Wrap raw arrays. Both may be finite at the same pore; the value wins
    /// when applied.
    pub fn from_arrays(value: Vec<Real>, rate: Vec<Real>) -> TransportResult<Self> {
        if value.len() != rate.len() {
            return Err(TransportError::input(format!(
                "value BC array has {} entries but rate BC array has {}",
                value.len(),
                rate.len()
            )));
        }
        Ok(Self { value, rate })
    }

    pub fn num_pores(&self) -> usize {
        self.value.len()
    }

    pub fn value(&self) -> &[Real] {
        &self.value
    }

    pub fn rate(&self) -> &[Real] {
        &self.rate
    }

    fn array(&self, kind: BcKind) -> &[Real] {
        match kind {
            BcKind::Value => &self.value,
            BcKind::Rate => &self.rate,
        }
    }

    fn array_mut(&mut self, kind: BcKind) -> &mut Vec<Real> {
        match kind {
            BcKind::Value => &mut self.value,
            BcKind::Rate => &mut self.rate,
        }
    }

    /// Pores carrying a condition of `kind`.
    pub fn mask(&self, kind: BcKind) -> Vec<bool> {
        self.array(kind).iter().map(|v| v.is_finite()).collect()
    }

    /// Pores carrying a condition of either kind.
    pub fn any_mask(&self) -> Vec<bool> {
        self.value
            .iter()
            .zip(&self.rate)
            .map(|(v, r)| v.is_finite() || r.is_finite())
            .collect()
    }

    pub fn pores(&self, kind: BcKind) -> Vec<usize> {
        self.array(kind)
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(p, _)| p)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.any_mask().into_iter().any(|m| m)
    }

    /// Register conditions of `kind` at `pores` (`None` = every pore).
    ///
    /// `values` is broadcast when it holds a single entry and is ignored in
    /// [`BcMode::Remove`].
    pub fn set(
        &mut self,
        kind: BcKind,
        pores: Option<&[usize]>,
        values: &[Real],
        mode: BcMode,
    ) -> TransportResult<()> {
        let n = self.num_pores();
        let pores: Vec<usize> = match pores {
            Some(p) => p
                .iter()
                .map(|&i| ensure_index(i, n, "boundary pore"))
                .collect::<Result<_, _>>()?,
            None => (0..n).collect(),
        };

        if mode == BcMode::Remove {
            let arr = self.array_mut(kind);
            for &p in &pores {
                arr[p] = Real::NAN;
            }
            return Ok(());
        }

        let values = broadcast(values, pores.len())?;
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(TransportError::input(format!(
                "boundary condition values must be finite, got {bad}"
            )));
        }

        match mode {
            BcMode::Add => {
                let taken: Vec<usize> = pores
                    .iter()
                    .copied()
                    .filter(|&p| self.value[p].is_finite() || self.rate[p].is_finite())
                    .collect();
                if !taken.is_empty() {
                    return Err(TransportError::input(format!(
                        "pores {taken:?} already carry a boundary condition; \
                         use overwrite mode to replace it"
                    )));
                }
            }
            BcMode::Overwrite => {
                let other = match kind {
                    BcKind::Value => BcKind::Rate,
                    BcKind::Rate => BcKind::Value,
                };
                let arr = self.array_mut(other);
                for &p in &pores {
                    arr[p] = Real::NAN;
                }
            }
            BcMode::Remove => {}
        }

        let arr = self.array_mut(kind);
        for (&p, v) in pores.iter().zip(values) {
            arr[p] = v;
        }
        Ok(())
    }

    /// Clear every condition of `kind`.
    pub fn clear(&mut self, kind: BcKind) {
        self.array_mut(kind).fill(Real::NAN);
    }
}

fn broadcast(values: &[Real], n: usize) -> TransportResult<Vec<Real>> {
    match values.len() {
        1 => Ok(vec![values[0]; n]),
        len if len == n => Ok(values.to_vec()),
        len => Err(TransportError::input(format!(
            "got {len} boundary values for {n} pores"
        ))),
    }
}

/// Inject boundary conditions into a boundary-free `(A, b)`.
///
/// Rate conditions overwrite `b`. Value conditions are applied afterwards,
/// so they take precedence at pores holding both: the pore's row and column
/// are eliminated, its diagonal set to `f = mean(diag(A))`, `b[i] = f * v`,
/// and the coupling moved to the right-hand side of the free pores. Zeros
/// left by the elimination are dropped from the sparsity pattern.
pub fn apply_boundary_conditions(
    a: CsrMatrix<Real>,
    mut b: Vec<Real>,
    bcs: &BoundaryConditions,
) -> (CsrMatrix<Real>, Vec<Real>) {
    for (bi, &r) in b.iter_mut().zip(bcs.rate()) {
        if r.is_finite() {
            *bi = r;
        }
    }

    let fixed = bcs.mask(BcKind::Value);
    if !fixed.iter().any(|&f| f) {
        return (a, b);
    }

    let f = mean_diagonal(&a);
    let x_bc: Vec<Real> = bcs
        .value()
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect();
    let coupling = matvec(&a, &x_bc);
    for (i, bi) in b.iter_mut().enumerate() {
        if fixed[i] {
            *bi = x_bc[i] * f;
        } else {
            *bi -= coupling[i];
        }
    }

    let mut a = a;
    let mut has_diag = vec![false; fixed.len()];
    for (i, j, v) in a.triplet_iter_mut() {
        if fixed[i] || fixed[j] {
            if i == j {
                *v = f;
                has_diag[i] = true;
            } else {
                *v = 0.0;
            }
        }
    }
    let missing: Vec<Real> = fixed
        .iter()
        .zip(&has_diag)
        .map(|(&fx, &hd)| if fx && !hd { f } else { 0.0 })
        .collect();
    if missing.iter().any(|&d| d != 0.0) {
        a = add_to_diagonal(&a, &missing);
    }
    (drop_zeros(&a), b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_network::NetworkBuilder;
    use pf_solver::sparse::{entry, is_symmetric};

    fn chain_laplacian() -> CsrMatrix<Real> {
        NetworkBuilder::from_conns(3, vec![[0, 1], [1, 2]])
            .build()
            .unwrap()
            .laplacian(&[2.0, 2.0])
            .unwrap()
    }

    #[test]
    fn set_broadcasts_and_validates() {
        let mut bcs = BoundaryConditions::new(4);
        bcs.set(BcKind::Value, Some(&[0, 3]), &[1.0], BcMode::Add)
            .unwrap();
        assert_eq!(bcs.pores(BcKind::Value), vec![0, 3]);

        assert!(bcs
            .set(BcKind::Rate, Some(&[1, 2]), &[1.0, 2.0, 3.0], BcMode::Add)
            .is_err());
        assert!(bcs
            .set(BcKind::Rate, Some(&[7]), &[1.0], BcMode::Add)
            .is_err());
        assert!(bcs
            .set(BcKind::Rate, Some(&[1]), &[Real::NAN], BcMode::Add)
            .is_err());
    }

    #[test]
    fn add_refuses_double_assignment() {
        let mut bcs = BoundaryConditions::new(3);
        bcs.set(BcKind::Value, Some(&[0]), &[1.0], BcMode::Add)
            .unwrap();
        let err = bcs
            .set(BcKind::Rate, Some(&[0]), &[5.0], BcMode::Add)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidInput { .. }));
        assert!(bcs.rate()[0].is_nan());
    }

    #[test]
    fn overwrite_clears_the_other_kind() {
        let mut bcs = BoundaryConditions::new(3);
        bcs.set(BcKind::Value, Some(&[0, 1]), &[1.0], BcMode::Add)
            .unwrap();
        bcs.set(BcKind::Rate, Some(&[1]), &[4.0], BcMode::Overwrite)
            .unwrap();
        assert_eq!(bcs.pores(BcKind::Value), vec![0]);
        assert_eq!(bcs.pores(BcKind::Rate), vec![1]);

        bcs.set(BcKind::Value, None, &[], BcMode::Remove).unwrap();
        assert!(bcs.pores(BcKind::Value).is_empty());
        bcs.clear(BcKind::Rate);
        assert!(bcs.is_empty());
    }

    #[test]
    fn rate_bcs_only_touch_b() {
        let a = chain_laplacian();
        let mut bcs = BoundaryConditions::new(3);
        bcs.set(BcKind::Rate, Some(&[0, 2]), &[1.5, -1.5], BcMode::Add)
            .unwrap();
        let (a2, b) = apply_boundary_conditions(a.clone(), vec![0.0; 3], &bcs);
        assert_eq!(a2, a);
        assert_eq!(b, vec![1.5, 0.0, -1.5]);
    }

    #[test]
    fn value_bcs_eliminate_rows_and_columns() {
        let a = chain_laplacian();
        let mut bcs = BoundaryConditions::new(3);
        bcs.set(BcKind::Value, Some(&[0, 2]), &[10.0, 0.0], BcMode::Add)
            .unwrap();
        let (a, b) = apply_boundary_conditions(a, vec![0.0; 3], &bcs);

        let f = 8.0 / 3.0;
        assert!((entry(&a, 0, 0) - f).abs() < 1e-12);
        assert!((entry(&a, 2, 2) - f).abs() < 1e-12);
        assert_eq!(entry(&a, 0, 1), 0.0);
        assert_eq!(entry(&a, 1, 0), 0.0);
        assert_eq!(entry(&a, 1, 1), 4.0);
        // eliminated couplings are gone from the pattern, not stored as zero
        assert_eq!(a.nnz(), 3);
        assert!(is_symmetric(&a, 0.0));

        assert!((b[0] - 10.0 * f).abs() < 1e-12);
        assert_eq!(b[1], 20.0);
        assert_eq!(b[2], 0.0);
    }

    #[test]
    fn value_wins_over_rate_at_the_same_pore() {
        let a = chain_laplacian();
        let bcs = BoundaryConditions::from_arrays(
            vec![3.0, Real::NAN, Real::NAN],
            vec![7.0, Real::NAN, 1.0],
        )
        .unwrap();
        let (a, b) = apply_boundary_conditions(a, vec![0.0; 3], &bcs);
        let f = 8.0 / 3.0;
        assert!((b[0] - 3.0 * f).abs() < 1e-12);
        assert!((entry(&a, 0, 0) - f).abs() < 1e-12);
        assert_eq!(b[2], 1.0);
    }

    #[test]
    fn isolated_value_pore_gets_a_diagonal() {
        // pore 2 is isolated, so its Laplacian diagonal is an explicit zero
        let a = NetworkBuilder::from_conns(3, vec![[0, 1]])
            .build()
            .unwrap()
            .laplacian(&[1.0])
            .unwrap();
        let mut bcs = BoundaryConditions::new(3);
        bcs.set(BcKind::Value, Some(&[2]), &[4.0], BcMode::Add)
            .unwrap();
        let (a, b) = apply_boundary_conditions(a, vec![0.0; 3], &bcs);
        let f = 2.0 / 3.0;
        assert!((entry(&a, 2, 2) - f).abs() < 1e-12);
        assert!((b[2] - 4.0 * f).abs() < 1e-12);
    }
}
