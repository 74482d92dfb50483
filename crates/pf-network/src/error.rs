//! Network-specific error types.

use pf_core::CoreError;

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Network construction and adjacency errors.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// A throat refers to a pore that doesn't exist.
    InvalidPoreRef { throat: usize, pore: usize },

    /// A throat connects a pore to itself.
    SelfLoop { throat: usize, pore: usize },

    /// Directional weights differ between the two directions of a throat.
    AsymmetricWeights { throat: usize, forward: f64, backward: f64 },

    /// Shared numeric/shape failure.
    Core(CoreError),
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::InvalidPoreRef { throat, pore } => {
                write!(f, "Throat {} refers to non-existent pore {}", throat, pore)
            }
            NetworkError::SelfLoop { throat, pore } => {
                write!(f, "Throat {} connects pore {} to itself", throat, pore)
            }
            NetworkError::AsymmetricWeights {
                throat,
                forward,
                backward,
            } => {
                write!(
                    f,
                    "Throat {} has direction-dependent weights ({} vs {}); reduce them to one value per throat first",
                    throat, forward, backward
                )
            }
            NetworkError::Core(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<CoreError> for NetworkError {
    fn from(err: CoreError) -> Self {
        NetworkError::Core(err)
    }
}
