//! Constraint-driven layout for rectangular elements.
//!
//! This crate turns declarative relationships between elements
//! ("left of A equals right of B plus 10") into solved geometry.
//!
//! # Architecture
//!
//! 1. **Variable registry**: each (element, edge) pair gets one solver variable
//! 2. **Translation**: descriptors become required linear constraints
//! 3. **Sessions**: one incremental solver per container, anchored by stays
//!    on the container's own edges
//! 4. **Propagation**: solved values are written back onto the elements
//!
//! All state lives in a caller-owned [`LayoutEngine`].
//!
//! # Example
//!
//! ```ignore
//! use fluent_core::{Attribute, Color, ConstraintDescriptor, Item, Rect, Relation, Scene};
//! use fluent_layout::LayoutEngine;
//!
//! let mut scene = Scene::new();
//! let container = scene.insert(Color::WHITE, Rect::new(0, 100, 0, 50));
//! let child = scene.insert(Color::RED, Rect::default());
//!
//! let mut engine = LayoutEngine::new();
//! engine.apply_constraints(&mut scene, container, &[
//!     ConstraintDescriptor::relative(
//!         Item::new(child, Attribute::Left),
//!         Relation::Equal,
//!         Item::new(container, Attribute::Left),
//!         1.0,
//!         5.0,
//!     ),
//! ])?;
//! ```

mod engine;
mod options;
mod propagate;
mod session;

pub use engine::LayoutEngine;
pub use options::{EngineOptions, PropagationScope, Rounding};
pub use propagate::propagate;
pub use session::{SessionState, SolverSession};
