//! Integration tests for pf-network.

use pf_network::{NetworkBuilder, NetworkError};

#[test]
fn build_cubic_like_lattice() {
    // 3 x 2 lattice:
    // 0 - 1 - 2
    // |   |   |
    // 3 - 4 - 5
    let mut builder = NetworkBuilder::new();
    builder.add_pores(6);
    for [a, b] in [[0, 1], [1, 2], [3, 4], [4, 5], [0, 3], [1, 4], [2, 5]] {
        builder.add_throat(a, b);
    }
    let net = builder.build().unwrap();

    assert_eq!(net.num_pores(), 6);
    assert_eq!(net.num_throats(), 7);
    assert!(net.cluster_labels().iter().all(|&l| l == 0));

    let l = net.laplacian(&[1.0; 7]).unwrap();
    assert_eq!(l.nrows(), 6);
    // 7 throats x 2 off-diagonal + 6 diagonal
    assert_eq!(l.nnz(), 20);
}

#[test]
fn invalid_reference_is_rejected() {
    let err = NetworkBuilder::from_conns(2, vec![[0, 2]]).build().unwrap_err();
    assert_eq!(err, NetworkError::InvalidPoreRef { throat: 0, pore: 2 });
    assert!(err.to_string().contains("non-existent pore 2"));
}

#[test]
fn anchoring_across_clusters() {
    let net = NetworkBuilder::from_conns(6, vec![[0, 1], [2, 3], [4, 5]])
        .build()
        .unwrap();
    let mut anchored = vec![false; 6];
    anchored[0] = true;
    anchored[3] = true;
    assert_eq!(net.unanchored_pores(&anchored), vec![4, 5]);
}
