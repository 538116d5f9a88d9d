//! Solver sessions.
//!
//! A session owns one incremental solver for one container element. The
//! container's four edges are stayed when the session is created, so the
//! container frame is the reference its children are laid out against.
//! Constraints accumulate across calls; a call that fails is rolled back to
//! the state before it started.

use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use fluent_constraint::{ConstraintId, Solver, SolverError, Translator, Variable, VariableRegistry};
use fluent_core::{ConstraintDescriptor, ConstraintError, Edge, ElementId, ElementStore, LayoutError};

use crate::options::EngineOptions;

/// Outcome of the most recent call on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Stays added, nothing solved yet
    Initialized,
    /// The last call solved successfully
    Solved,
    /// The last call failed and was rolled back
    Failed,
}

/// One solver bound to one container.
#[derive(Debug, Clone)]
pub struct SolverSession {
    container: ElementId,
    solver: Solver,
    stays: IndexMap<Edge, ConstraintId>,
    state: SessionState,
}

impl SolverSession {
    /// Create a session and stay the container's edges at their current
    /// values.
    pub fn new<S: ElementStore + ?Sized>(
        container: ElementId,
        registry: &mut VariableRegistry,
        store: &S,
        options: &EngineOptions,
    ) -> Result<Self, LayoutError> {
        let mut solver = Solver::new();
        let mut stays = IndexMap::new();

        for edge in Edge::ALL {
            let variable = registry.resolve_edge(store, container, edge)?;
            let value = registry.value(variable).unwrap_or_default();
            let id = solver
                .add_stay(variable, value, options.stay_strength)
                .map_err(|err| to_constraint_error(err, || format!("stay {container}.{edge}")))?;
            stays.insert(edge, id);
        }

        debug!(container = container.0; "Created solver session");
        Ok(Self {
            container,
            solver,
            stays,
            state: SessionState::Initialized,
        })
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Handle of the stay on one of the container's edges.
    pub fn stay(&self, edge: Edge) -> Option<ConstraintId> {
        self.stays.get(&edge).copied()
    }

    pub fn constraint_count(&self) -> usize {
        self.solver.constraint_count()
    }

    /// Variables this session's solver knows about.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.solver.variables()
    }

    /// Add the descriptors and solve, recording solved values in the
    /// registry. On error the session is restored to its state before the
    /// call and no values are recorded.
    pub fn apply<S: ElementStore + ?Sized>(
        &mut self,
        registry: &mut VariableRegistry,
        store: &S,
        descriptors: &[ConstraintDescriptor],
        options: &EngineOptions,
    ) -> Result<(), LayoutError> {
        let checkpoint = self.solver.clone();

        if let Err(err) = self.add_all(registry, store, descriptors, options) {
            warn!(container = self.container.0; "Rolling back failed layout call: {err}");
            self.solver = checkpoint;
            self.state = SessionState::Failed;
            return Err(err);
        }

        self.solver.update_variables();
        for (variable, value) in self.solver.values() {
            registry.set_value(variable, value);
        }
        self.state = SessionState::Solved;
        Ok(())
    }

    fn add_all<S: ElementStore + ?Sized>(
        &mut self,
        registry: &mut VariableRegistry,
        store: &S,
        descriptors: &[ConstraintDescriptor],
        options: &EngineOptions,
    ) -> Result<(), LayoutError> {
        for descriptor in descriptors {
            let constraint = Translator::new(registry, store).translate(descriptor)?;

            if let Some(strength) = options.anchor_strength {
                for variable in constraint.expression.variables() {
                    if self.solver.has_variable(variable) {
                        continue;
                    }
                    let value = registry.value(variable).unwrap_or_default();
                    self.check_capacity(options)?;
                    trace!(variable = variable.id(), value; "Anchoring new variable");
                    self.solver
                        .add_stay(variable, value, strength)
                        .map_err(|err| to_constraint_error(err, || format!("anchor on {variable}")))?;
                }
            }

            self.check_capacity(options)?;
            self.solver
                .add_constraint(constraint)
                .map_err(|err| to_constraint_error(err, || descriptor.to_string()))?;
        }
        Ok(())
    }

    fn check_capacity(&self, options: &EngineOptions) -> Result<(), ConstraintError> {
        if self.solver.constraint_count() >= options.max_constraints {
            return Err(ConstraintError::CapacityExceeded {
                limit: options.max_constraints,
            });
        }
        Ok(())
    }

    /// Diagnostic dump of the session's solver and variables.
    pub fn summary(&self, registry: &VariableRegistry) -> String {
        SessionSummary {
            session: self,
            registry,
        }
        .to_string()
    }
}

fn to_constraint_error(err: SolverError, describe: impl FnOnce() -> String) -> ConstraintError {
    match err {
        SolverError::UnsatisfiableConstraint => ConstraintError::Infeasible {
            constraint_desc: describe(),
        },
        other => ConstraintError::Solver {
            reason: other.to_string(),
        },
    }
}

struct SessionSummary<'a> {
    session: &'a SolverSession,
    registry: &'a VariableRegistry,
}

impl fmt::Display for SessionSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Session {} ({:?})",
            self.session.container, self.session.state
        )?;
        write!(f, "{}", self.session.solver)?;
        writeln!(f, "Variables:")?;
        for variable in self.session.variables() {
            if let Some(entry) = self.registry.entry(variable) {
                writeln!(f, "  {} = {}", entry.name, entry.value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluent_core::{Attribute, Color, Item, Rect, Relation, Scene};

    fn setup() -> (Scene, ElementId, ElementId) {
        let mut scene = Scene::new();
        let container = scene.insert(Color::WHITE, Rect::new(0, 100, 0, 50));
        let child = scene.insert(Color::RED, Rect::default());
        (scene, container, child)
    }

    #[test]
    fn test_new_session_stays_container() {
        let (scene, container, _) = setup();
        let mut registry = VariableRegistry::new();
        let session =
            SolverSession::new(container, &mut registry, &scene, &EngineOptions::default()).unwrap();

        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(session.constraint_count(), 4);
        assert_eq!(registry.len(), 4);
        for edge in Edge::ALL {
            assert!(session.stay(edge).is_some());
        }
    }

    #[test]
    fn test_apply_records_values() {
        let (scene, container, child) = setup();
        let mut registry = VariableRegistry::new();
        let options = EngineOptions::default();
        let mut session = SolverSession::new(container, &mut registry, &scene, &options).unwrap();

        let desc = ConstraintDescriptor::relative(
            Item::new(child, Attribute::Left),
            Relation::Equal,
            Item::new(container, Attribute::Left),
            1.0,
            5.0,
        );
        session.apply(&mut registry, &scene, &[desc], &options).unwrap();

        assert_eq!(session.state(), SessionState::Solved);
        let left = registry.get(child, Edge::Left).unwrap();
        assert!((registry.value(left).unwrap() - 5.0).abs() < 0.001);
        // 4 stays, 1 anchor, 1 descriptor
        assert_eq!(session.constraint_count(), 6);
    }

    #[test]
    fn test_failed_apply_rolls_back() {
        let (scene, container, child) = setup();
        let mut registry = VariableRegistry::new();
        let options = EngineOptions::default();
        let mut session = SolverSession::new(container, &mut registry, &scene, &options).unwrap();

        let left = Item::new(child, Attribute::Left);
        let err = session
            .apply(
                &mut registry,
                &scene,
                &[
                    ConstraintDescriptor::constant(left, Relation::Equal, 0.0),
                    ConstraintDescriptor::constant(left, Relation::Equal, 10.0),
                ],
                &options,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            LayoutError::Constraint(ConstraintError::Infeasible { .. })
        ));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.constraint_count(), 4);

        // The session is still usable afterwards
        session
            .apply(
                &mut registry,
                &scene,
                &[ConstraintDescriptor::constant(left, Relation::Equal, 10.0)],
                &options,
            )
            .unwrap();
        let var = registry.get(child, Edge::Left).unwrap();
        assert!((registry.value(var).unwrap() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_capacity_limit() {
        let (scene, container, child) = setup();
        let mut registry = VariableRegistry::new();
        let options = EngineOptions {
            max_constraints: 5,
            anchor_strength: None,
            ..EngineOptions::default()
        };
        let mut session = SolverSession::new(container, &mut registry, &scene, &options).unwrap();

        let top = Item::new(child, Attribute::Top);
        session
            .apply(
                &mut registry,
                &scene,
                &[ConstraintDescriptor::constant(top, Relation::GreaterOrEqual, 0.0)],
                &options,
            )
            .unwrap();

        let err = session
            .apply(
                &mut registry,
                &scene,
                &[ConstraintDescriptor::constant(top, Relation::LessOrEqual, 40.0)],
                &options,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Constraint(ConstraintError::CapacityExceeded { limit: 5 })
        ));
        assert_eq!(session.constraint_count(), 5);
    }

    #[test]
    fn test_summary_names_variables() {
        let (scene, container, _) = setup();
        let mut registry = VariableRegistry::new();
        let options = EngineOptions::default();
        let mut session = SolverSession::new(container, &mut registry, &scene, &options).unwrap();
        session.apply(&mut registry, &scene, &[], &options).unwrap();

        let summary = session.summary(&registry);
        assert!(summary.starts_with("Session e1 (Solved)"));
        assert!(summary.contains("e1#FFFFFF.right = 100"));
        assert!(summary.contains("e1#FFFFFF.bottom = 50"));
    }
}
