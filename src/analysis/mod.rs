//! Analysis of sample bitmaps into palettes, patterns and compatibilities

/// Palette extraction and sample re-encoding
pub mod palette;
/// Pattern enumeration, symmetry expansion and overlap agreement
pub mod patterns;
