//! Frame rendering: per-style geometry, caption layout, and the `vello_cpu` raster backend.

/// Frame type and the renderer trait.
pub mod backend;
/// CPU raster backend powered by `vello_cpu`.
pub mod cpu;
/// Closed-form per-style geometry.
pub mod geometry;
/// Caption shaping and layout.
pub mod text;
