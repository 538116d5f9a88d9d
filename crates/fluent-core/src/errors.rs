//! Error types for the layout engine.

use crate::types::{Attribute, ElementId};
use thiserror::Error;

/// Top-level error type for a layout call.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Attribute '{attribute}' is derived and has no backing variable")]
    UnsupportedAttribute { attribute: Attribute },

    #[error("Unsupported relation: {relation}")]
    UnsupportedRelation { relation: String },

    #[error("Unknown attribute: {name}")]
    UnknownAttribute { name: String },

    #[error("Element {id} is not present in the element store")]
    UnknownElement { id: ElementId },

    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}

/// Errors during constraint solving.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("Unsatisfiable required constraint: {constraint_desc}")]
    Infeasible { constraint_desc: String },

    #[error("Session exceeded its limit of {limit} constraints")]
    CapacityExceeded { limit: usize },

    #[error("Solver error: {reason}")]
    Solver { reason: String },
}
