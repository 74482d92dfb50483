//! pf-core: shared foundation for poreflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float/array helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
