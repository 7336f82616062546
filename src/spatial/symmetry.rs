//! Tile symmetry classes and the orientation index bookkeeping they induce
//!
//! A tile's symmetry class determines how many distinct orientations it has
//! (its cardinality) and how orientation indices map into each other under a
//! quarter rotation and a reflection. Those two involutions generate the
//! eight entries of an orientation row: the four rotations of a variant
//! followed by the reflections of those rotations.

/// Shape-symmetry class of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    /// Fully symmetric; one orientation
    X,
    /// Two-fold line symmetry (straight segment); two orientations
    I,
    /// Corner shape; four orientations
    L,
    /// Three-way junction; four orientations
    T,
    /// Diagonal mirror symmetry (`\`); two orientations
    Diagonal,
}

impl Symmetry {
    /// Parse a catalog symmetry code; unknown codes fall back to `X`
    pub fn from_code(code: &str) -> Self {
        match code {
            "I" => Self::I,
            "L" => Self::L,
            "T" => Self::T,
            "\\" => Self::Diagonal,
            _ => Self::X,
        }
    }

    /// Number of distinct orientations of this class
    pub const fn cardinality(self) -> usize {
        match self {
            Self::X => 1,
            Self::I | Self::Diagonal => 2,
            Self::L | Self::T => 4,
        }
    }

    /// Orientation reached from `i` by a quarter rotation
    pub const fn rotated(self, i: usize) -> usize {
        match self {
            Self::X => i,
            Self::I | Self::Diagonal => 1 - i,
            Self::L | Self::T => (i + 1) % 4,
        }
    }

    /// Orientation reached from `i` by a reflection
    pub const fn reflected(self, i: usize) -> usize {
        match self {
            Self::X | Self::I => i,
            Self::Diagonal => 1 - i,
            Self::L => {
                if i % 2 == 0 {
                    i + 1
                } else {
                    i - 1
                }
            }
            Self::T => {
                if i % 2 == 0 {
                    i
                } else {
                    4 - i
                }
            }
        }
    }
}

/// Build the orientation rows for one declared tile
///
/// Row `t` lists, for each of the eight symmetry operations, the absolute
/// variant index reached from variant `base + t`: identity, the three
/// successive rotations, then the reflections of each rotation.
pub fn orientation_actions(symmetry: Symmetry, base: usize) -> Vec<[usize; 8]> {
    (0..symmetry.cardinality())
        .map(|t| {
            let r1 = symmetry.rotated(t);
            let r2 = symmetry.rotated(r1);
            let r3 = symmetry.rotated(r2);
            [
                base + t,
                base + r1,
                base + r2,
                base + r3,
                base + symmetry.reflected(t),
                base + symmetry.reflected(r1),
                base + symmetry.reflected(r2),
                base + symmetry.reflected(r3),
            ]
        })
        .collect()
}
