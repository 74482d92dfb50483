//! Connectivity queries.

use petgraph::unionfind::UnionFind;

use crate::network::Network;

impl Network {
    /// Cluster label for every pore; pores sharing a label are connected.
    ///
    /// Labels are the smallest pore index of each cluster.
    pub fn cluster_labels(&self) -> Vec<usize> {
        let mut uf = UnionFind::<usize>::new(self.num_pores);
        for &[a, b] in &self.conns {
            uf.union(a, b);
        }
        let mut min_of_root = vec![usize::MAX; self.num_pores];
        for p in 0..self.num_pores {
            let root = uf.find(p);
            min_of_root[root] = min_of_root[root].min(p);
        }
        (0..self.num_pores).map(|p| min_of_root[uf.find(p)]).collect()
    }

    /// Pores whose cluster contains none of the `anchored` pores.
    ///
    /// `anchored` is a pore mask of length `Np`.
    pub fn unanchored_pores(&self, anchored: &[bool]) -> Vec<usize> {
        let labels = self.cluster_labels();
        let mut cluster_anchored = vec![false; self.num_pores];
        for (p, &flag) in anchored.iter().enumerate().take(self.num_pores) {
            if flag {
                cluster_anchored[labels[p]] = true;
            }
        }
        (0..self.num_pores)
            .filter(|&p| !cluster_anchored[labels[p]])
            .collect()
    }
}
