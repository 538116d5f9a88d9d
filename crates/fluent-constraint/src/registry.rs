//! The attribute variable registry.
//!
//! Maps an (element, edge) pair to the one solver variable that stands for
//! it. Entries are only ever added. A variable's index in the registry is its
//! id, so lookups by variable are O(1).

use indexmap::IndexMap;
use log::trace;

use fluent_core::{Attribute, Edge, ElementId, ElementStore, LayoutError};

use crate::cassowary::Variable;

/// Registry key. Equality is element identity plus edge, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableKey {
    pub element: ElementId,
    pub edge: Edge,
}

/// A registered variable.
#[derive(Debug, Clone)]
pub struct VariableEntry {
    pub key: VariableKey,
    pub variable: Variable,
    /// Diagnostic name, e.g. `e1#FF0000.left`
    pub name: String,
    /// Seeded from the element on creation, then refreshed from solver results
    pub value: f64,
}

/// Single source of truth correlating solver variables with element edges.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    entries: IndexMap<VariableKey, VariableEntry>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a primitive attribute to its variable.
    ///
    /// Derived attributes (`Width`, `Height`) have no variable of their own
    /// and fail with [`LayoutError::UnsupportedAttribute`].
    pub fn resolve<S: ElementStore + ?Sized>(
        &mut self,
        store: &S,
        element: ElementId,
        attribute: Attribute,
    ) -> Result<Variable, LayoutError> {
        let edge = attribute
            .as_edge()
            .ok_or(LayoutError::UnsupportedAttribute { attribute })?;
        self.resolve_edge(store, element, edge)
    }

    /// Resolve an edge to its variable, creating it from the element's
    /// current value on first use.
    pub fn resolve_edge<S: ElementStore + ?Sized>(
        &mut self,
        store: &S,
        element: ElementId,
        edge: Edge,
    ) -> Result<Variable, LayoutError> {
        let key = VariableKey { element, edge };
        if let Some(entry) = self.entries.get(&key) {
            return Ok(entry.variable);
        }

        let value = store
            .edge(element, edge)
            .ok_or(LayoutError::UnknownElement { id: element })?;
        let variable = Variable::new(self.entries.len());
        let name = format!("{}.{}", store.label(element), edge);
        trace!(variable = variable.id(), value; "Registered variable {name}");

        self.entries.insert(
            key,
            VariableEntry {
                key,
                variable,
                name,
                value: f64::from(value),
            },
        );
        Ok(variable)
    }

    /// Look up an existing variable without creating one.
    pub fn get(&self, element: ElementId, edge: Edge) -> Option<Variable> {
        self.entries
            .get(&VariableKey { element, edge })
            .map(|e| e.variable)
    }

    pub fn entry(&self, variable: Variable) -> Option<&VariableEntry> {
        self.entries.get_index(variable.id()).map(|(_, e)| e)
    }

    pub fn value(&self, variable: Variable) -> Option<f64> {
        self.entry(variable).map(|e| e.value)
    }

    /// Record a solved value. Returns `false` for unknown variables.
    pub fn set_value(&mut self, variable: Variable, value: f64) -> bool {
        match self.entries.get_index_mut(variable.id()) {
            Some((_, entry)) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluent_core::{Color, Rect, Scene};

    #[test]
    fn test_resolve_seeds_from_element() {
        let mut scene = Scene::new();
        let a = scene.insert(Color::RED, Rect::new(10, 60, 5, 25));

        let mut registry = VariableRegistry::new();
        let left = registry.resolve(&scene, a, Attribute::Left).unwrap();
        let bottom = registry.resolve(&scene, a, Attribute::Bottom).unwrap();

        assert_ne!(left, bottom);
        assert_eq!(registry.value(left), Some(10.0));
        assert_eq!(registry.value(bottom), Some(25.0));
        assert_eq!(registry.entry(left).unwrap().name, "e1#FF0000.left");
    }

    #[test]
    fn test_resolve_is_stable() {
        let mut scene = Scene::new();
        let a = scene.insert(Color::RED, Rect::new(10, 60, 5, 25));

        let mut registry = VariableRegistry::new();
        let first = registry.resolve(&scene, a, Attribute::Right).unwrap();

        // Element mutations after creation do not reseed the variable
        scene.get_mut(a).unwrap().rect.right = 500;
        let second = registry.resolve(&scene, a, Attribute::Right).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.value(first), Some(60.0));
    }

    #[test]
    fn test_derived_attribute_has_no_variable() {
        let mut scene = Scene::new();
        let a = scene.insert(Color::RED, Rect::default());

        let mut registry = VariableRegistry::new();
        let err = registry.resolve(&scene, a, Attribute::Width).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::UnsupportedAttribute { attribute: Attribute::Width }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_element() {
        let scene = Scene::new();
        let mut registry = VariableRegistry::new();
        let err = registry.resolve_edge(&scene, ElementId(4), Edge::Top).unwrap_err();
        assert!(matches!(err, LayoutError::UnknownElement { id: ElementId(4) }));
    }

    #[test]
    fn test_same_color_elements_do_not_collide() {
        let mut scene = Scene::new();
        let a = scene.insert(Color::BLUE, Rect::new(0, 10, 0, 10));
        let b = scene.insert(Color::BLUE, Rect::new(20, 30, 0, 10));

        let mut registry = VariableRegistry::new();
        let va = registry.resolve_edge(&scene, a, Edge::Left).unwrap();
        let vb = registry.resolve_edge(&scene, b, Edge::Left).unwrap();

        assert_ne!(va, vb);
        assert_eq!(registry.value(va), Some(0.0));
        assert_eq!(registry.value(vb), Some(20.0));
    }

    #[test]
    fn test_set_value() {
        let mut scene = Scene::new();
        let a = scene.insert(Color::RED, Rect::default());
        let mut registry = VariableRegistry::new();
        let v = registry.resolve_edge(&scene, a, Edge::Top).unwrap();

        assert!(registry.set_value(v, 12.5));
        assert_eq!(registry.value(v), Some(12.5));
        assert!(!registry.set_value(Variable::new(9), 1.0));
        assert_eq!(registry.get(a, Edge::Top), Some(v));
        assert_eq!(registry.get(a, Edge::Left), None);
    }
}
