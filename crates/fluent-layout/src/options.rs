//! Engine configuration.

use fluent_constraint::Strength;

/// Which variables are written back to elements after a successful solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PropagationScope {
    /// Only variables known to the session that was just solved
    #[default]
    Session,
    /// Every registered variable, across all sessions
    Global,
}

/// How a solved value becomes an integer edge coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rounding {
    /// Round half up, toward positive infinity
    #[default]
    Nearest,
    /// Round toward negative infinity
    Floor,
}

impl Rounding {
    /// Both modes commute with integer shifts, so integer differences
    /// between solved values survive rounding.
    pub fn apply(&self, value: f64) -> i32 {
        match self {
            Rounding::Nearest => (value + 0.5).floor() as i32,
            Rounding::Floor => value.floor() as i32,
        }
    }
}

/// Options for a [`LayoutEngine`](crate::LayoutEngine).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    /// Strength of the stays pinning a container's own edges
    pub stay_strength: Strength,
    /// Strength of the stay given to any other variable the first time a
    /// session sees it; `None` lets unconstrained variables fall to zero
    pub anchor_strength: Option<Strength>,
    /// Which variables are written back after a solve
    pub propagation: PropagationScope,
    /// Conversion from solved values to edge coordinates
    pub rounding: Rounding,
    /// Maximum number of constraints a single session may hold
    pub max_constraints: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            stay_strength: Strength::STRONG,
            anchor_strength: Some(Strength::WEAK),
            propagation: PropagationScope::Session,
            rounding: Rounding::Nearest,
            max_constraints: 4096,
        }
    }
}
