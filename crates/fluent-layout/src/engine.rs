//! The layout engine: caller-owned state for every session.

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;

use fluent_constraint::VariableRegistry;
use fluent_core::{Attribute, ConstraintDescriptor, Edge, ElementId, ElementStore, LayoutError};

use crate::options::{EngineOptions, PropagationScope};
use crate::propagate::propagate;
use crate::session::SolverSession;

/// Owns the variable registry and one solver session per container.
///
/// Independent engines never share variables, so separate layout universes
/// do not interfere with each other.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: EngineOptions,
    registry: VariableRegistry,
    sessions: IndexMap<ElementId, SolverSession>,
}

impl LayoutEngine {
    /// Create an engine with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given options.
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn session(&self, container: ElementId) -> Option<&SolverSession> {
        self.sessions.get(&container)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Solve `descriptors` in the session for `container` and write the
    /// results back to `store`.
    ///
    /// The session is created on first use, with stays on the container's
    /// edges. Calls on the same container are additive. Returns the
    /// session's diagnostic summary. On error nothing is written and the
    /// session is left as it was before the call.
    pub fn apply_constraints<S: ElementStore + ?Sized>(
        &mut self,
        store: &mut S,
        container: ElementId,
        descriptors: &[ConstraintDescriptor],
    ) -> Result<String, LayoutError> {
        debug!(container = container.0, descriptors = descriptors.len(); "Applying constraints");

        let session = match self.sessions.entry(container) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(SolverSession::new(
                container,
                &mut self.registry,
                &*store,
                &self.options,
            )?),
        };

        session.apply(&mut self.registry, &*store, descriptors, &self.options)?;

        let rounding = self.options.rounding;
        let written = match self.options.propagation {
            PropagationScope::Session => {
                propagate(&self.registry, store, session.variables(), rounding)
            }
            PropagationScope::Global => propagate(
                &self.registry,
                store,
                self.registry.iter().map(|entry| entry.variable),
                rounding,
            ),
        };
        debug!(
            container = container.0,
            written,
            constraints = session.constraint_count();
            "Layout solved"
        );

        Ok(session.summary(&self.registry))
    }

    /// The engine's current value for an attribute, if its edges are
    /// registered. Derived attributes are computed from their edges.
    pub fn value(&self, element: ElementId, attribute: Attribute) -> Option<f64> {
        let edge_value = |edge: Edge| {
            self.registry
                .get(element, edge)
                .and_then(|v| self.registry.value(v))
        };
        match attribute.as_edge() {
            Some(edge) => edge_value(edge),
            None if attribute == Attribute::Width => {
                Some(edge_value(Edge::Right)? - edge_value(Edge::Left)?)
            }
            None => Some(edge_value(Edge::Bottom)? - edge_value(Edge::Top)?),
        }
    }
}
