//! Helpers over compressed sparse row matrices.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use pf_core::Real;

/// Diagonal of a square matrix; missing entries read as zero.
pub fn diagonal(a: &CsrMatrix<Real>) -> Vec<Real> {
    let mut diag = vec![0.0; a.nrows().min(a.ncols())];
    for (i, j, v) in a.triplet_iter() {
        if i == j {
            diag[i] += *v;
        }
    }
    diag
}

/// Mean of the diagonal, zero for an empty matrix.
pub fn mean_diagonal(a: &CsrMatrix<Real>) -> Real {
    let diag = diagonal(a);
    if diag.is_empty() {
        0.0
    } else {
        diag.iter().sum::<Real>() / diag.len() as Real
    }
}

/// Stored value at `(i, j)`, zero when structurally absent.
pub fn entry(a: &CsrMatrix<Real>, i: usize, j: usize) -> Real {
    if i >= a.nrows() {
        return 0.0;
    }
    let row = a.row(i);
    row.col_indices()
        .iter()
        .zip(row.values())
        .filter(|&(&c, _)| c == j)
        .map(|(_, v)| *v)
        .sum()
}

/// `y = A x`.
pub fn matvec(a: &CsrMatrix<Real>, x: &[Real]) -> Vec<Real> {
    let mut y = vec![0.0; a.nrows()];
    for (i, j, v) in a.triplet_iter() {
        y[i] += v * x[j];
    }
    y
}

/// True when `|A[i,j] - A[j,i]| <= tol` for every stored entry.
pub fn is_symmetric(a: &CsrMatrix<Real>, tol: Real) -> bool {
    a.nrows() == a.ncols()
        && a
            .triplet_iter()
            .all(|(i, j, v)| (v - entry(a, j, i)).abs() <= tol)
}

/// True when every stored value is finite.
pub fn values_finite(a: &CsrMatrix<Real>) -> bool {
    a.values().iter().all(|v| v.is_finite())
}

/// Drop explicitly stored zeros.
pub fn drop_zeros(a: &CsrMatrix<Real>) -> CsrMatrix<Real> {
    a.filter(|_, _, v| *v != 0.0)
}

/// Dense copy (duplicates summed).
pub fn to_dense(a: &CsrMatrix<Real>) -> DMatrix<Real> {
    let mut dense = DMatrix::zeros(a.nrows(), a.ncols());
    for (i, j, v) in a.triplet_iter() {
        dense[(i, j)] += *v;
    }
    dense
}

/// Add `deltas[i]` to `A[i,i]`, inserting diagonal entries where absent.
pub fn add_to_diagonal(a: &CsrMatrix<Real>, deltas: &[Real]) -> CsrMatrix<Real> {
    let mut coo = CooMatrix::new(a.nrows(), a.ncols());
    for (i, j, v) in a.triplet_iter() {
        coo.push(i, j, *v);
    }
    for (i, &d) in deltas.iter().enumerate().take(a.nrows().min(a.ncols())) {
        if d != 0.0 {
            coo.push(i, i, d);
        }
    }
    CsrMatrix::from(&coo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix<Real> {
        // [ 2 -1  0]
        // [-1  2 -1]
        // [ 0 -1  2]
        let mut coo = CooMatrix::new(3, 3);
        for (i, j, v) in [
            (0, 0, 2.0),
            (0, 1, -1.0),
            (1, 0, -1.0),
            (1, 1, 2.0),
            (1, 2, -1.0),
            (2, 1, -1.0),
            (2, 2, 2.0),
        ] {
            coo.push(i, j, v);
        }
        CsrMatrix::from(&coo)
    }

    #[test]
    fn diagonal_and_mean() {
        let a = sample();
        assert_eq!(diagonal(&a), vec![2.0, 2.0, 2.0]);
        assert_eq!(mean_diagonal(&a), 2.0);
    }

    #[test]
    fn matvec_and_entry() {
        let a = sample();
        assert_eq!(matvec(&a, &[1.0, 1.0, 1.0]), vec![1.0, 0.0, 1.0]);
        assert_eq!(entry(&a, 1, 2), -1.0);
        assert_eq!(entry(&a, 0, 2), 0.0);
        assert!(is_symmetric(&a, 0.0));
    }

    #[test]
    fn zeros_are_dropped() {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, 1.0);
        coo.push(0, 1, 0.0);
        coo.push(1, 1, 1.0);
        let a = CsrMatrix::from(&coo);
        assert_eq!(a.nnz(), 3);
        assert_eq!(drop_zeros(&a).nnz(), 2);
    }

    #[test]
    fn add_to_diagonal_inserts_missing_entries() {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 1, 1.0);
        coo.push(1, 0, 1.0);
        let a = add_to_diagonal(&CsrMatrix::from(&coo), &[3.0, 0.0]);
        assert_eq!(diagonal(&a), vec![3.0, 0.0]);
        assert_eq!(a.nnz(), 3);
        assert_eq!(to_dense(&a)[(0, 1)], 1.0);
    }
}
