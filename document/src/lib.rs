//! Structured document model for the LocalWrite editor.
//!
//! A [`Document`] is an ordered, never-empty sequence of [`Block`] containers
//! whose leaves are styled [`TextRun`]s. The model carries no rendering logic:
//! it provides the data shape, the structural invariants
//! ([`Document::validate`]), normalization and the handful of editing
//! primitives (see [`edit`]) that the auto-format engine and the editor session
//! build on.

pub mod document;
pub mod edit;
pub mod node;
pub mod point;

pub use document::{Document, SchemaViolation};
pub use edit::EditError;
pub use node::{Align, Block, BlockAttrs, BlockKind, Mark, Node, TextRun};
pub use point::{Point, Selection};
