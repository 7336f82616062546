//! Mathematical utilities for the algorithm

/// Weighted index selection from a nonnegative distribution
pub mod sampler;
