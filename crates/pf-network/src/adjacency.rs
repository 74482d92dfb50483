//! Weighted adjacency and graph Laplacian construction.

use nalgebra_sparse::{CooMatrix, CsrMatrix};
use pf_core::{Real, Tolerances, ensure_len, nearly_equal};

use crate::error::{NetworkError, NetworkResult};
use crate::network::Network;

impl Network {
    /// Weighted adjacency matrix in coordinate form.
    ///
    /// Each throat contributes its weight at both `(p0, p1)` and `(p1, p0)`.
    /// Parallel throats between the same pair are kept as separate triplets
    /// and summed on conversion to compressed form.
    pub fn create_adjacency_matrix(&self, weights: &[Real]) -> NetworkResult<CooMatrix<Real>> {
        ensure_len(weights.len(), self.num_throats(), "throat weights")?;

        let n = self.num_pores;
        let mut coo = CooMatrix::new(n, n);
        for (&[a, b], &w) in self.conns.iter().zip(weights) {
            coo.push(a, b, w);
            coo.push(b, a, w);
        }
        Ok(coo)
    }

    /// Graph Laplacian of the throat weights: the boundary-free transport matrix.
    pub fn laplacian(&self, weights: &[Real]) -> NetworkResult<CsrMatrix<Real>> {
        let adjacency = self.create_adjacency_matrix(weights)?;
        Ok(laplacian(&adjacency))
    }
}

/// `L = D - W` for a square adjacency `W`.
///
/// Diagonal entries hold the sum of incident weights and are always stored,
/// even for isolated pores, so the diagonal is structurally complete.
pub fn laplacian(adjacency: &CooMatrix<Real>) -> CsrMatrix<Real> {
    let n = adjacency.nrows();
    let mut degree = vec![0.0; n];
    let mut coo = CooMatrix::new(n, adjacency.ncols());

    for (i, j, &w) in adjacency.triplet_iter() {
        if i == j {
            continue;
        }
        coo.push(i, j, -w);
        degree[i] += w;
    }
    for (i, d) in degree.into_iter().enumerate() {
        coo.push(i, i, d);
    }

    CsrMatrix::from(&coo)
}

/// Collapse `Nt x 2` directional weights to one value per throat.
///
/// Both directions must agree within `tol`; non-finite entries are passed
/// through untouched so they can be diagnosed downstream.
pub fn reduce_directional(pairs: &[[Real; 2]], tol: Tolerances) -> NetworkResult<Vec<Real>> {
    pairs
        .iter()
        .enumerate()
        .map(|(t, &[forward, backward])| {
            if !forward.is_finite() {
                Ok(forward)
            } else if !backward.is_finite() {
                Ok(backward)
            } else if nearly_equal(forward, backward, tol) {
                Ok(forward)
            } else {
                Err(NetworkError::AsymmetricWeights {
                    throat: t,
                    forward,
                    backward,
                })
            }
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::NetworkBuilder;
    use proptest::prelude::*;

    fn network_and_weights() -> impl Strategy<Value = (Network, Vec<Real>)> {
        (2usize..12)
            .prop_flat_map(|n| {
                let pair = (0..n, 0..n).prop_filter("no self loops", |(a, b)| a != b);
                (Just(n), prop::collection::vec(pair, 1..30))
            })
            .prop_flat_map(|(n, pairs)| {
                let len = pairs.len();
                (
                    Just(n),
                    Just(pairs),
                    prop::collection::vec(0.0_f64..100.0, len),
                )
            })
            .prop_map(|(n, pairs, weights)| {
                let conns = pairs.into_iter().map(|(a, b)| [a, b]).collect();
                let net = NetworkBuilder::from_conns(n, conns).build().unwrap();
                (net, weights)
            })
    }

    proptest! {
        #[test]
        fn laplacian_is_symmetric_with_zero_row_sums((net, weights) in network_and_weights()) {
            let l = net.laplacian(&weights).unwrap();
            let dense = nalgebra_sparse_to_rows(&l);
            let n = net.num_pores();
            for i in 0..n {
                let row_sum: Real = dense[i].iter().sum();
                prop_assert!(row_sum.abs() < 1e-9);
                for j in 0..n {
                    prop_assert!((dense[i][j] - dense[j][i]).abs() < 1e-12);
                }
            }
        }
    }

    fn nalgebra_sparse_to_rows(m: &CsrMatrix<Real>) -> Vec<Vec<Real>> {
        let mut rows = vec![vec![0.0; m.ncols()]; m.nrows()];
        for (i, j, v) in m.triplet_iter() {
            rows[i][j] += *v;
        }
        rows
    }
}
