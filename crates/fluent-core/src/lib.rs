//! Core types, element storage, and errors for the fluent layout engine.
//!
//! This crate provides the foundational types shared by the other crates:
//! - Element identity, display color, and edge rectangles
//! - Geometric attributes, relations, and constraint descriptors
//! - The [`ElementStore`] seam the engine reads and writes geometry through
//! - Error types

pub mod element;
pub mod errors;
pub mod types;

pub use element::*;
pub use errors::*;
pub use types::*;
