//! pf-phase: property stores consumed by the transport engine.
//!
//! A [`Phase`] holds named pore and throat arrays (`pore.*`, `throat.*`)
//! plus a registry of the models that compute them. The registry doubles as
//! the property [`DependencyGraph`] used to trace non-finite values back to
//! the property that produced them.

pub mod dependency;
pub mod error;
pub mod health;
pub mod model;
pub mod phase;
pub mod project;
pub mod values;

pub use dependency::DependencyGraph;
pub use error::{PhaseError, PhaseResult};
pub use health::HealthStatus;
pub use model::{Model, ModelFn};
pub use phase::Phase;
pub use project::Project;
pub use values::{Element, PropertyValues};
