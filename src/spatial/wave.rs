//! Dense possibility field over output cells and candidate patterns
//!
//! The field is stored as a single flat buffer with stride arithmetic
//! (`x`, then `y`, then pattern), which keeps the inner propagation loops
//! contiguous. Entries only ever flip from permitted to forbidden between
//! resets, so every sweep over the field is monotone.

use ndarray::{Array2, Array3};

/// Possibility field plus the change flags driving propagation
#[derive(Debug, Clone)]
pub struct WaveGrid {
    /// `possible[[x, y, t]]` is true while pattern `t` may occupy cell `(x, y)`
    possible: Array3<bool>,
    /// Cells touched since the last propagation visit
    changed: Array2<bool>,
    width: usize,
    height: usize,
    pattern_count: usize,
}

impl WaveGrid {
    /// Allocate a field with every pattern permitted everywhere
    pub fn new(width: usize, height: usize, pattern_count: usize) -> Self {
        Self {
            possible: Array3::from_elem((width, height, pattern_count), true),
            changed: Array2::from_elem((width, height), false),
            width,
            height,
            pattern_count,
        }
    }

    /// Re-permit every pattern and drop all change flags
    pub fn reset(&mut self) {
        self.possible.fill(true);
        self.changed.fill(false);
    }

    /// Output width in cells
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Output height in cells
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of candidate patterns per cell
    pub const fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Whether pattern `t` is still permitted at `(x, y)`
    #[inline]
    pub fn allows(&self, x: usize, y: usize, t: usize) -> bool {
        self.possible[[x, y, t]]
    }

    /// Forbid pattern `t` at `(x, y)` and flag the cell for propagation
    #[inline]
    pub fn forbid(&mut self, x: usize, y: usize, t: usize) {
        self.possible[[x, y, t]] = false;
        self.changed[[x, y]] = true;
    }

    /// Collapse `(x, y)` to the single pattern `chosen` and flag the cell
    pub fn collapse_to(&mut self, x: usize, y: usize, chosen: usize) {
        for t in 0..self.pattern_count {
            self.possible[[x, y, t]] = t == chosen;
        }
        self.changed[[x, y]] = true;
    }

    /// Whether `(x, y)` is flagged as changed
    #[inline]
    pub fn is_changed(&self, x: usize, y: usize) -> bool {
        self.changed[[x, y]]
    }

    /// Consume the change flag at `(x, y)`, returning its prior value
    #[inline]
    pub fn take_changed(&mut self, x: usize, y: usize) -> bool {
        std::mem::replace(&mut self.changed[[x, y]], false)
    }

    /// Number of patterns still permitted at `(x, y)`
    pub fn allowed_count(&self, x: usize, y: usize) -> usize {
        (0..self.pattern_count)
            .filter(|&t| self.possible[[x, y, t]])
            .count()
    }

    /// Lowest-numbered pattern still permitted at `(x, y)`, if any
    pub fn first_allowed(&self, x: usize, y: usize) -> Option<usize> {
        (0..self.pattern_count).find(|&t| self.possible[[x, y, t]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_leaves_exactly_one_pattern() {
        let mut wave = WaveGrid::new(4, 4, 5);
        wave.collapse_to(2, 1, 3);

        assert_eq!(wave.allowed_count(2, 1), 1);
        assert_eq!(wave.first_allowed(2, 1), Some(3));
        assert!(wave.is_changed(2, 1));
        assert_eq!(wave.allowed_count(0, 0), 5);
    }

    #[test]
    fn test_take_changed_consumes_the_flag() {
        let mut wave = WaveGrid::new(2, 2, 2);
        wave.forbid(1, 0, 1);

        assert!(wave.take_changed(1, 0));
        assert!(!wave.take_changed(1, 0));
        assert!(!wave.allows(1, 0, 1));
        assert!(wave.allows(1, 0, 0));
    }

    #[test]
    fn test_reset_restores_all_patterns() {
        let mut wave = WaveGrid::new(3, 3, 4);
        wave.collapse_to(0, 0, 1);
        wave.reset();

        assert_eq!(wave.allowed_count(0, 0), 4);
        assert!(!wave.is_changed(0, 0));
    }
}
