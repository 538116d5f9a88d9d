//! Translation of constraint descriptors into solver constraints.

use log::trace;

use fluent_core::{Attribute, ConstraintDescriptor, Edge, ElementId, ElementStore, LayoutError};

use crate::cassowary::{Constraint, Expression, Strength};
use crate::registry::VariableRegistry;

/// Builds solver expressions and constraints, populating the registry as it
/// goes.
pub struct Translator<'a, S: ElementStore + ?Sized> {
    registry: &'a mut VariableRegistry,
    store: &'a S,
}

impl<'a, S: ElementStore + ?Sized> Translator<'a, S> {
    pub fn new(registry: &'a mut VariableRegistry, store: &'a S) -> Self {
        Self { registry, store }
    }

    /// The linear expression for an attribute.
    ///
    /// Edges map to their variable. `Width` is `right - left` and `Height`
    /// is `bottom - top`.
    pub fn expression_for(
        &mut self,
        element: ElementId,
        attribute: Attribute,
    ) -> Result<Expression, LayoutError> {
        let expr = match attribute {
            Attribute::Left => self.edge(element, Edge::Left)?,
            Attribute::Right => self.edge(element, Edge::Right)?,
            Attribute::Top => self.edge(element, Edge::Top)?,
            Attribute::Bottom => self.edge(element, Edge::Bottom)?,
            Attribute::Width => self.edge(element, Edge::Right)? - self.edge(element, Edge::Left)?,
            Attribute::Height => self.edge(element, Edge::Bottom)? - self.edge(element, Edge::Top)?,
        };
        Ok(expr)
    }

    fn edge(&mut self, element: ElementId, edge: Edge) -> Result<Expression, LayoutError> {
        let variable = self.registry.resolve_edge(self.store, element, edge)?;
        Ok(Expression::from_variable(variable))
    }

    /// Translate a descriptor into a required constraint.
    ///
    /// `first REL second * multiplier + constant` becomes
    /// `first - (second * multiplier + constant) REL 0`.
    pub fn translate(&mut self, descriptor: &ConstraintDescriptor) -> Result<Constraint, LayoutError> {
        let lhs = self.expression_for(descriptor.first.element, descriptor.first.attribute)?;

        let rhs = match descriptor.second {
            Some(second) => {
                self.expression_for(second.element, second.attribute)? * descriptor.multiplier
                    + descriptor.constant
            }
            None => Expression::from_constant(descriptor.constant),
        };

        let constraint = Constraint::new(lhs - rhs, descriptor.relation, Strength::REQUIRED);
        trace!("Translated {descriptor} into {constraint}");
        Ok(constraint)
    }
}
