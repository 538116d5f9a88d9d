//! Core value types for layout constraints.

use std::fmt;
use std::str::FromStr;

use crate::errors::LayoutError;

/// Unique identifier for elements.
///
/// This is the only identity the engine uses. Two elements that look the
/// same (same color, same rectangle) are still distinct if their ids differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A display color. Informational only, never used for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create from hex string (e.g., "#FF5733" or "FF5733CC").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        match hex.len() {
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    // Common colors
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

/// The four stored edge coordinates of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a rect from its four edges.
    pub const fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self { left, right, top, bottom }
    }

    /// Right minus left.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Bottom minus top.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Read a single edge.
    pub fn edge(&self, edge: Edge) -> i32 {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    /// Write a single edge.
    pub fn set_edge(&mut self, edge: Edge, value: i32) {
        match edge {
            Edge::Left => self.left = value,
            Edge::Right => self.right = value,
            Edge::Top => self.top = value,
            Edge::Bottom => self.bottom = value,
        }
    }
}

/// A primitive attribute, stored directly on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// All edges, in stay order.
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    pub fn name(&self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A geometric attribute a constraint can refer to.
///
/// `Width` and `Height` are derived: they are `Right - Left` and
/// `Bottom - Top` and have no backing variable of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Left,
    Right,
    Top,
    Bottom,
    Width,
    Height,
}

impl Attribute {
    /// The backing edge, or `None` for derived attributes.
    pub fn as_edge(&self) -> Option<Edge> {
        match self {
            Attribute::Left => Some(Edge::Left),
            Attribute::Right => Some(Edge::Right),
            Attribute::Top => Some(Edge::Top),
            Attribute::Bottom => Some(Edge::Bottom),
            Attribute::Width | Attribute::Height => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.as_edge().is_none()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Left => "left",
            Attribute::Right => "right",
            Attribute::Top => "top",
            Attribute::Bottom => "bottom",
            Attribute::Width => "width",
            Attribute::Height => "height",
        }
    }
}

impl From<Edge> for Attribute {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Left => Attribute::Left,
            Edge::Right => Attribute::Right,
            Edge::Top => Attribute::Top,
            Edge::Bottom => Attribute::Bottom,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Attribute::Left),
            "right" => Ok(Attribute::Right),
            "top" => Ok(Attribute::Top),
            "bottom" => Ok(Attribute::Bottom),
            "width" => Ok(Attribute::Width),
            "height" => Ok(Attribute::Height),
            _ => Err(LayoutError::UnknownAttribute { name: s.to_string() }),
        }
    }
}

/// The relation between the two sides of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::LessOrEqual => "<=",
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Relation {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" | "=" => Ok(Relation::Equal),
            ">=" => Ok(Relation::GreaterOrEqual),
            "<=" => Ok(Relation::LessOrEqual),
            other => Err(LayoutError::UnsupportedRelation {
                relation: other.to_string(),
            }),
        }
    }
}

/// One side of a constraint: an attribute of a specific element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub element: ElementId,
    pub attribute: Attribute,
}

impl Item {
    pub fn new(element: ElementId, attribute: Attribute) -> Self {
        Self { element, attribute }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.element, self.attribute)
    }
}

/// A declarative layout relationship.
///
/// Reads as `first REL second * multiplier + constant`, or
/// `first REL constant` when there is no second item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintDescriptor {
    pub first: Item,
    pub relation: Relation,
    pub second: Option<Item>,
    pub multiplier: f64,
    pub constant: f64,
}

impl ConstraintDescriptor {
    /// `first REL constant`
    pub fn constant(first: Item, relation: Relation, constant: f64) -> Self {
        Self {
            first,
            relation,
            second: None,
            multiplier: 1.0,
            constant,
        }
    }

    /// `first REL second * multiplier + constant`
    pub fn relative(
        first: Item,
        relation: Relation,
        second: Item,
        multiplier: f64,
        constant: f64,
    ) -> Self {
        Self {
            first,
            relation,
            second: Some(second),
            multiplier,
            constant,
        }
    }
}

impl fmt::Display for ConstraintDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.first, self.relation)?;
        match self.second {
            Some(second) => write!(f, "{} * {} + {}", second, self.multiplier, self.constant),
            None => write!(f, "{}", self.constant),
        }
    }
}
