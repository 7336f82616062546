//! Pattern enumeration, symmetry expansion and overlap agreement
//!
//! Patterns are flat row-major `N*N` arrays of palette indices. Each pattern
//! value has a unique base-`C` integer encoding (`C` = palette size), which
//! is what the frequency tally is keyed on. Enumeration walks the sample,
//! expands each window into its dihedral orbit, and keeps the first
//! `symmetry` members, so indices are assigned in first-seen order.

use ndarray::Array3;
use std::collections::HashMap;

use crate::analysis::palette::SampleGrid;
use crate::io::configuration::MAX_SYMMETRY;
use crate::io::error::{invalid_parameter, Result};

/// A flat row-major `N*N` window of palette indices
pub type Pattern = Vec<usize>;

/// Build an `n * n` pattern from a per-cell generator
fn build<F: FnMut(usize, usize) -> usize>(n: usize, mut cell: F) -> Pattern {
    let mut result = vec![0; n * n];
    for y in 0..n {
        for x in 0..n {
            result[x + y * n] = cell(x, y);
        }
    }
    result
}

/// Extract the pattern whose top-left corner sits at `(x, y)`, wrapping
fn from_sample(grid: &SampleGrid, x: usize, y: usize, n: usize) -> Pattern {
    build(n, |dx, dy| grid.index_wrapped(x + dx, y + dy))
}

/// Quarter rotation of a pattern
pub fn rotate(pattern: &Pattern, n: usize) -> Pattern {
    build(n, |x, y| pattern[n - 1 - y + x * n])
}

/// Horizontal reflection of a pattern
pub fn reflect(pattern: &Pattern, n: usize) -> Pattern {
    build(n, |x, y| pattern[n - 1 - x + y * n])
}

/// Base-`C` positional encoding of a pattern; injective per pattern value
fn encode(pattern: &Pattern, color_count: usize) -> u64 {
    let mut result: u64 = 0;
    let mut power: u64 = 1;
    for i in 0..pattern.len() {
        result += pattern[pattern.len() - 1 - i] as u64 * power;
        if i + 1 < pattern.len() {
            power *= color_count as u64;
        }
    }
    result
}

/// Invert [`encode`], reconstructing the flat pattern
fn decode(mut key: u64, color_count: usize, n: usize) -> Pattern {
    let mut result = vec![0; n * n];
    let mut power = (color_count as u64).pow((n * n - 1) as u32);
    for cell in &mut result {
        *cell = (key / power) as usize;
        key %= power;
        if power > 1 {
            power /= color_count as u64;
        }
    }
    result
}

/// Whether two patterns agree on the overlap of windows offset by `(dx, dy)`
pub fn agrees(p1: &Pattern, p2: &Pattern, dx: i32, dy: i32, n: usize) -> bool {
    let n_i = n as i32;
    let (xmin, xmax) = if dx < 0 { (0, dx + n_i) } else { (dx, n_i) };
    let (ymin, ymax) = if dy < 0 { (0, dy + n_i) } else { (dy, n_i) };

    for y in ymin..ymax {
        for x in xmin..xmax {
            let own = (x + n_i * y) as usize;
            let other = ((x - dx) + n_i * (y - dy)) as usize;
            if p1[own] != p2[other] {
                return false;
            }
        }
    }

    true
}

/// Unique patterns of a sample with their observation frequencies
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// Unique patterns in first-seen order
    pub patterns: Vec<Pattern>,
    /// Observation count per pattern, symmetry variants included
    pub weights: Vec<f64>,
    /// Index of the pattern observed at the bottom-left enumeration corner
    pub ground: Option<usize>,
}

impl PatternSet {
    /// Enumerate the unique `n * n` patterns of a sample
    ///
    /// Non-periodic samples contribute only fully-contained windows; periodic
    /// samples contribute every position with wrapping. Each window's dihedral
    /// orbit is expanded by alternating reflections and rotations, and the
    /// first `symmetry` orbit members are tallied. When `ground` is set, the
    /// pattern observed untransformed at `(0, vertical_bound - 1)` is
    /// recorded for bottom-row pinning.
    ///
    /// # Errors
    ///
    /// Returns an error if `symmetry` is outside `[1, 8]`, if a non-periodic
    /// sample is smaller than the pattern size, or if the palette is too
    /// large for the pattern encoding to stay injective.
    pub fn extract(
        grid: &SampleGrid,
        n: usize,
        periodic_input: bool,
        symmetry: usize,
        ground: bool,
    ) -> Result<Self> {
        if symmetry < 1 || symmetry > MAX_SYMMETRY {
            return Err(invalid_parameter(
                "symmetry",
                &symmetry,
                &format!("must be between 1 and {MAX_SYMMETRY}"),
            ));
        }
        if !periodic_input && (grid.width() < n || grid.height() < n) {
            return Err(invalid_parameter(
                "pattern_size",
                &n,
                &"non-periodic sample is smaller than the pattern size",
            ));
        }
        ensure_encoding_fits(grid.color_count(), n)?;

        let (horizontal_bound, vertical_bound) = if periodic_input {
            (grid.width(), grid.height())
        } else {
            (grid.width() - n + 1, grid.height() - n + 1)
        };

        let mut weights: HashMap<u64, f64> = HashMap::new();
        let mut order: Vec<u64> = Vec::new();
        let mut position: HashMap<u64, usize> = HashMap::new();
        let mut ground_index = None;

        for y in 0..vertical_bound {
            for x in 0..horizontal_bound {
                let orbit = dihedral_orbit(from_sample(grid, x, y, n), n);

                for (k, member) in orbit.iter().take(symmetry).enumerate() {
                    let key = encode(member, grid.color_count());
                    if let Some(weight) = weights.get_mut(&key) {
                        *weight += 1.0;
                    } else {
                        position.insert(key, order.len());
                        order.push(key);
                        weights.insert(key, 1.0);
                    }

                    if ground && k == 0 && x == 0 && y == vertical_bound - 1 {
                        ground_index = position.get(&key).copied();
                    }
                }
            }
        }

        let patterns = order
            .iter()
            .map(|&key| decode(key, grid.color_count(), n))
            .collect();
        let tallies = order.iter().map(|key| weights[key]).collect();

        Ok(Self {
            patterns,
            weights: tallies,
            ground: ground_index,
        })
    }

    /// Number of unique patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern was enumerated
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The eight dihedral orbit members of a pattern, by alternating reflections
/// and rotations
fn dihedral_orbit(base: Pattern, n: usize) -> [Pattern; 8] {
    let p0 = base;
    let p1 = reflect(&p0, n);
    let p2 = rotate(&p0, n);
    let p3 = reflect(&p2, n);
    let p4 = rotate(&p2, n);
    let p5 = reflect(&p4, n);
    let p6 = rotate(&p4, n);
    let p7 = reflect(&p6, n);
    [p0, p1, p2, p3, p4, p5, p6, p7]
}

/// Reject palettes whose base-`C` pattern encoding would overflow
fn ensure_encoding_fits(color_count: usize, n: usize) -> Result<()> {
    let mut capacity: u64 = 1;
    for _ in 0..n * n {
        capacity = capacity.checked_mul(color_count as u64).ok_or_else(|| {
            invalid_parameter(
                "palette",
                &color_count,
                &format!("too many colors for {n}x{n} pattern indexing"),
            )
        })?;
    }
    Ok(())
}

/// Precompute, for every pattern and relative offset, the patterns whose
/// shifted window agrees on the overlap
///
/// Indexed `[[t, dx + n - 1, dy + n - 1]]`; each entry lists the compatible
/// pattern indices in ascending order.
pub fn compatibility_table(patterns: &[Pattern], n: usize) -> Array3<Vec<usize>> {
    let span = 2 * n - 1;
    Array3::from_shape_fn((patterns.len(), span, span), |(t, dx, dy)| {
        let dx = dx as i32 - (n as i32 - 1);
        let dy = dy as i32 - (n as i32 - 1);
        patterns
            .iter()
            .enumerate()
            .filter(|(_, candidate)| agrees(&patterns[t], candidate, dx, dy, n))
            .map(|(t2, _)| t2)
            .collect()
    })
}
