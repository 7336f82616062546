//! Core constraint-propagation engine and its two input models

/// Model capability trait and the observe/propagate lifecycle
pub mod model;
/// Overlapping-pattern model learned from a sample bitmap
pub mod overlapping;
/// Shared solver state: possibility field, weights and random source
pub mod solver;
/// Tile-catalog model with declared adjacency and symmetry
pub mod tiled;
