//! Core network data structure.

/// The network: a validated, immutable set of pores joined by throats.
///
/// `conns[t] = [p0, p1]` is the ordered endpoint pair of throat `t`.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) num_pores: usize,
    pub(crate) conns: Vec<[usize; 2]>,
}

impl Network {
    /// Number of pores (`Np`).
    pub fn num_pores(&self) -> usize {
        self.num_pores
    }

    /// Number of throats (`Nt`).
    pub fn num_throats(&self) -> usize {
        self.conns.len()
    }

    /// All throat endpoint pairs.
    pub fn conns(&self) -> &[[usize; 2]] {
        &self.conns
    }
}
