//! pf-network: pore network topology layer for poreflow.
//!
//! Provides:
//! - Immutable network of pores and throats
//! - Incremental network builder with validation
//! - Weighted adjacency and graph Laplacian construction
//! - Connectivity queries used by topology health checks
//!
//! # Example
//!
//! ```
//! use pf_network::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new();
//! let p0 = builder.add_pore();
//! let p1 = builder.add_pore();
//! let t0 = builder.add_throat(p0, p1);
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.num_pores(), 2);
//! assert_eq!(network.num_throats(), 1);
//! assert_eq!(network.conns()[t0], [p0, p1]);
//! ```

pub mod adjacency;
pub mod builder;
pub mod error;
pub mod network;
pub mod topology;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use adjacency::{laplacian, reduce_directional};
pub use builder::NetworkBuilder;
pub use error::{NetworkError, NetworkResult};
pub use network::Network;
