//! Constraint solving for the fluent layout engine.
//!
//! This crate implements:
//! - Cassowary simplex algorithm with strengths and stays
//! - The attribute variable registry
//! - Translation of constraint descriptors into solver constraints

mod cassowary;
mod registry;
mod translate;

pub use cassowary::{
    Constraint, ConstraintId, Expression, Solver, SolverError, Strength, Term, Variable,
};
pub use registry::{VariableEntry, VariableKey, VariableRegistry};
pub use translate::Translator;
