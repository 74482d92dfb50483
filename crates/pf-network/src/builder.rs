//! Incremental network builder.

use crate::error::NetworkResult;
use crate::network::Network;
use crate::validate;

/// Builder for constructing a network incrementally.
///
/// Use `add_pore` and `add_throat` to build up the topology,
/// then call `build()` to validate and freeze it into an immutable `Network`.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    num_pores: usize,
    conns: Vec<[usize; 2]>,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing pore count and connection list.
    pub fn from_conns(num_pores: usize, conns: Vec<[usize; 2]>) -> Self {
        Self { num_pores, conns }
    }

    /// Add a pore and return its index.
    pub fn add_pore(&mut self) -> usize {
        self.num_pores += 1;
        self.num_pores - 1
    }

    /// Add `count` pores, returning the index of the first one.
    pub fn add_pores(&mut self, count: usize) -> usize {
        let first = self.num_pores;
        self.num_pores += count;
        first
    }

    /// Add a throat between two pores and return its index.
    pub fn add_throat(&mut self, p0: usize, p1: usize) -> usize {
        self.conns.push([p0, p1]);
        self.conns.len() - 1
    }

    /// Build and validate the network.
    pub fn build(self) -> NetworkResult<Network> {
        validate::validate_conns(self.num_pores, &self.conns)?;
        Ok(Network {
            num_pores: self.num_pores,
            conns: self.conns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkError;

    #[test]
    fn builder_basic() {
        let mut builder = NetworkBuilder::new();
        let p0 = builder.add_pore();
        let p1 = builder.add_pore();
        let t0 = builder.add_throat(p0, p1);

        assert_eq!(p0, 0);
        assert_eq!(p1, 1);
        assert_eq!(t0, 0);
        assert_eq!(builder.num_pores, 2);
        assert_eq!(builder.conns.len(), 1);
    }

    #[test]
    fn builder_build_chain() {
        let mut builder = NetworkBuilder::new();
        let first = builder.add_pores(3);
        builder.add_throat(first, first + 1);
        builder.add_throat(first + 1, first + 2);

        let network = builder.build().unwrap();
        assert_eq!(network.num_pores(), 3);
        assert_eq!(network.num_throats(), 2);
        assert_eq!(network.conns(), &[[0, 1], [1, 2]]);
    }

    #[test]
    fn builder_rejects_self_loop() {
        let err = NetworkBuilder::from_conns(2, vec![[1, 1]]).build().unwrap_err();
        assert_eq!(err, NetworkError::SelfLoop { throat: 0, pore: 1 });
    }
}
