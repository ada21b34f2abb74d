//! Core types for Cartograph diagram layout.
//!
//! This crate holds the vocabulary shared by the layout engine and its
//! callers: geometric primitives, the input [`spec::Specification`] tree,
//! node type tags, theme metrics and text measurement.

pub mod color;
pub mod geometry;
pub mod node;
pub mod spec;
pub mod text;
pub mod theme;
