//! Error types for property store operations.

use thiserror::Error;

/// Result type for property store operations.
pub type PhaseResult<T> = Result<T, PhaseError>;

/// Errors raised by phases, models and the dependency graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhaseError {
    /// Property name lacks a `pore.` or `throat.` prefix.
    #[error("Invalid property name '{name}': must start with 'pore.' or 'throat.'")]
    InvalidName { name: String },

    /// Property not present on the phase.
    #[error("Property '{name}' not found on phase '{phase}'")]
    UnknownProperty { phase: String, name: String },

    /// Array length doesn't match the element count.
    #[error("Property '{name}' has length {actual}, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Array has the wrong shape for the requested use.
    #[error("Property '{name}' has the wrong shape: {what}")]
    WrongShape { name: String, what: &'static str },

    /// Registering a model would create a dependency cycle.
    #[error("Model for '{prop}' would create a dependency cycle")]
    CyclicDependency { prop: String },

    /// A model failed while regenerating.
    #[error("Model for '{prop}' failed: {message}")]
    Model { prop: String, message: String },

    /// Phase not present in the project.
    #[error("Phase '{name}' not found in project")]
    UnknownPhase { name: String },

    /// Phase name already taken.
    #[error("Phase '{name}' already exists in project")]
    DuplicatePhase { name: String },
}
