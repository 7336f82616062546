//! Shared solver state embedded by every concrete model
//!
//! Owns the possibility field, the stationary weight vector, the seeded
//! random source and the generation flags. The observation scratch buffer is
//! preallocated here so the per-cell distribution rebuild never allocates and
//! never aliases the stationary weights.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::sampler::weighted_index;
use crate::spatial::WaveGrid;

/// Solver state shared between the observe loop and the concrete models
#[derive(Debug)]
pub struct Solver {
    pub(crate) wave: WaveGrid,
    pub(crate) stationary: Vec<f64>,
    pub(crate) periodic: bool,
    rng: Option<StdRng>,
    initialized: bool,
    successful: bool,
    scratch: Vec<f64>,
}

impl Solver {
    /// Allocate solver state for a `width x height` output over the given
    /// stationary weights
    pub fn new(width: usize, height: usize, stationary: Vec<f64>, periodic: bool) -> Self {
        let pattern_count = stationary.len();
        Self {
            wave: WaveGrid::new(width, height, pattern_count),
            stationary,
            periodic,
            rng: None,
            initialized: false,
            successful: false,
            scratch: vec![0.0; pattern_count],
        }
    }

    /// Output width in cells
    pub const fn width(&self) -> usize {
        self.wave.width()
    }

    /// Output height in cells
    pub const fn height(&self) -> usize {
        self.wave.height()
    }

    /// Number of candidate patterns
    pub const fn pattern_count(&self) -> usize {
        self.wave.pattern_count()
    }

    /// Whether output coordinates wrap toroidally
    pub const fn periodic(&self) -> bool {
        self.periodic
    }

    /// Whether pattern `t` is still permitted at `(x, y)`
    pub fn allows(&self, x: usize, y: usize, t: usize) -> bool {
        self.wave.allows(x, y, t)
    }

    /// Number of patterns still permitted at `(x, y)`
    pub fn allowed_count(&self, x: usize, y: usize) -> usize {
        self.wave.allowed_count(x, y)
    }

    /// Whether the last finished generation ended without contradiction
    pub const fn is_successful(&self) -> bool {
        self.successful
    }

    pub(crate) const fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn finish(&mut self, successful: bool) {
        self.successful = successful;
    }

    /// Install a deterministic random source
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    /// Draw the next uniform `[0, 1)` value, seeding from the OS if no seed
    /// was installed
    pub(crate) fn next_random(&mut self) -> f64 {
        self.rng
            .get_or_insert_with(StdRng::from_os_rng)
            .random::<f64>()
    }

    /// Reset the possibility field and generation flags for a fresh run
    pub(crate) fn clear_base(&mut self) {
        self.wave.reset();
        self.rng.get_or_insert_with(StdRng::from_os_rng);
        self.initialized = true;
        self.successful = false;
    }

    /// Rebuild the scratch distribution for `(x, y)` and return its total
    ///
    /// `scratch[t]` becomes the stationary weight of `t` where still
    /// permitted and zero elsewhere; a zero total marks a contradiction.
    pub(crate) fn support(&mut self, x: usize, y: usize) -> f64 {
        let mut sum = 0.0;
        for t in 0..self.pattern_count() {
            let weight = if self.wave.allows(x, y, t) {
                self.stationary[t]
            } else {
                0.0
            };
            self.scratch[t] = weight;
            sum += weight;
        }
        sum
    }

    /// Shannon entropy of the scratch distribution normalized by `sum`
    pub(crate) fn scratch_entropy(&self, sum: f64) -> f64 {
        let mut entropy = 0.0;
        for &weight in &self.scratch {
            if weight > 0.0 {
                let p = weight / sum;
                entropy -= p * p.ln();
            }
        }
        entropy
    }

    /// Collapse `(x, y)` to one pattern drawn from the permitted stationary
    /// distribution
    pub(crate) fn collapse(&mut self, x: usize, y: usize) {
        self.support(x, y);
        let r = self.next_random();
        let chosen = weighted_index(&mut self.scratch, r);
        self.wave.collapse_to(x, y, chosen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_masks_forbidden_patterns() {
        let mut solver = Solver::new(2, 2, vec![1.0, 2.0, 3.0], true);
        solver.wave.forbid(0, 0, 1);

        let sum = solver.support(0, 0);
        assert!((sum - 4.0).abs() < f64::EPSILON);
        assert!((solver.scratch[1]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entropy_of_single_option_is_zero() {
        let mut solver = Solver::new(1, 1, vec![1.0, 1.0], true);
        solver.wave.forbid(0, 0, 1);

        let sum = solver.support(0, 0);
        assert!(solver.scratch_entropy(sum).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let mut a = Solver::new(1, 1, vec![1.0], true);
        let mut b = Solver::new(1, 1, vec![1.0], true);
        a.set_seed(7);
        b.set_seed(7);

        for _ in 0..16 {
            assert!((a.next_random() - b.next_random()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_collapse_respects_the_mask() {
        let mut solver = Solver::new(1, 1, vec![1.0, 1.0, 1.0], true);
        solver.set_seed(3);
        solver.wave.forbid(0, 0, 0);
        solver.wave.forbid(0, 0, 2);

        solver.collapse(0, 0);
        assert_eq!(solver.wave.first_allowed(0, 0), Some(1));
        assert_eq!(solver.allowed_count(0, 0), 1);
    }
}
