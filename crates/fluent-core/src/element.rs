//! Element storage.
//!
//! The engine never owns elements. It reads and writes their edges through
//! [`ElementStore`], which the surrounding application implements. [`Scene`]
//! is a simple arena implementation for applications and tests that have
//! nothing better.

use indexmap::IndexMap;

use crate::types::{Color, Edge, ElementId, Rect};

/// Access to the geometry of caller-owned elements.
pub trait ElementStore {
    /// Current value of an edge, or `None` if the element is unknown.
    fn edge(&self, id: ElementId, edge: Edge) -> Option<i32>;

    /// Overwrite an edge. Returns `false` if the element is unknown.
    fn set_edge(&mut self, id: ElementId, edge: Edge, value: i32) -> bool;

    /// Human-readable name used in solver diagnostics.
    fn label(&self, id: ElementId) -> String {
        id.to_string()
    }
}

/// A rectangular on-screen element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub id: ElementId,
    pub color: Color,
    pub rect: Rect,
}

impl Element {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            color: Color::default(),
            rect: Rect::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }
}

/// An insertion-ordered arena of elements.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: IndexMap<ElementId, Element>,
    next_id: u64,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element and return its id.
    pub fn insert(&mut self, color: Color, rect: Rect) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        let element = Element::new(id).with_color(color).with_rect(rect);
        self.elements.insert(id, element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// The element's rectangle.
    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(&id).map(|e| e.rect)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ElementStore for Scene {
    fn edge(&self, id: ElementId, edge: Edge) -> Option<i32> {
        self.rect(id).map(|r| r.edge(edge))
    }

    fn set_edge(&mut self, id: ElementId, edge: Edge, value: i32) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                element.rect.set_edge(edge, value);
                true
            }
            None => false,
        }
    }

    fn label(&self, id: ElementId) -> String {
        match self.elements.get(&id) {
            Some(element) => format!("{}{}", id, element.color),
            None => id.to_string(),
        }
    }
}
