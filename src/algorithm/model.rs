//! Model capability trait and the observe/propagate lifecycle
//!
//! Concrete models embed a [`Solver`] and supply the three operations the
//! cycle cannot know generically: which cells observation must skip, one
//! propagation sweep, and the reset-plus-seeding performed before a run. The
//! lifecycle itself (entropy scan, collapse, fixed-point propagation,
//! iteration bookkeeping) is shared through the provided methods.

use crate::algorithm::solver::Solver;
use crate::io::configuration::ENTROPY_NOISE_SCALE;

/// Outcome of one observation pass over the field
pub enum Observation {
    /// Some cell has no permitted pattern left
    Contradiction,
    /// Every observable cell is already collapsed
    Complete,
    /// One cell was collapsed and flagged for propagation
    Collapsed,
}

/// Capability contract implemented by each input model
pub trait Model {
    /// Shared solver state
    fn base(&self) -> &Solver;

    /// Shared solver state, mutably
    fn base_mut(&mut self) -> &mut Solver;

    /// Whether observation must skip the cell at `(x, y)`
    fn on_boundary(&self, x: usize, y: usize) -> bool;

    /// Run one propagation sweep; true iff any possibility was eliminated
    fn propagate(&mut self) -> bool;

    /// Reset the field and apply model-specific seeding
    fn clear(&mut self);

    /// Install a deterministic random source
    fn set_seed(&mut self, seed: u64) {
        self.base_mut().set_seed(seed);
    }

    /// Whether the last finished generation ended without contradiction
    fn is_successful(&self) -> bool {
        self.base().is_successful()
    }

    /// Run up to `iterations` observe/propagate cycles (zero means
    /// unbounded); true iff the generation finished
    ///
    /// A finished generation may still be a contradiction; consult
    /// [`Model::is_successful`] to distinguish.
    fn advance(&mut self, iterations: usize) -> bool {
        if !self.base().is_initialized() {
            self.clear();
        }

        let mut completed = 0;
        while iterations == 0 || completed < iterations {
            if self.step().is_some() {
                return true;
            }
            completed += 1;
        }

        false
    }

    /// Reset and run cycles until the generation finishes; true on success
    fn solve(&mut self) -> bool {
        self.clear();
        loop {
            if let Some(successful) = self.step() {
                return successful;
            }
        }
    }

    /// Execute a single observe/propagate cycle
    ///
    /// Returns `Some(successful)` once the generation finished, `None` while
    /// it should keep running.
    fn step(&mut self) -> Option<bool> {
        match self.observe() {
            Observation::Contradiction => {
                self.base_mut().finish(false);
                Some(false)
            }
            Observation::Complete => {
                self.base_mut().finish(true);
                Some(true)
            }
            Observation::Collapsed => {
                while self.propagate() {}
                None
            }
        }
    }

    /// Collapse the lowest-entropy observable cell
    ///
    /// Scans every non-boundary cell, rebuilding its permitted stationary
    /// distribution; a zero total is a contradiction. Tie-breaking noise is
    /// drawn for every visited cell so the random stream does not depend on
    /// which cell ends up winning.
    fn observe(&mut self) -> Observation {
        let (width, height) = {
            let base = self.base();
            (base.width(), base.height())
        };

        let mut min_entropy = f64::INFINITY;
        let mut argmin = None;

        for x in 0..width {
            for y in 0..height {
                if self.on_boundary(x, y) {
                    continue;
                }

                let base = self.base_mut();
                let sum = base.support(x, y);
                if sum <= 0.0 {
                    return Observation::Contradiction;
                }

                let entropy = base.scratch_entropy(sum);
                let noise = ENTROPY_NOISE_SCALE * base.next_random();
                if entropy > 0.0 && entropy + noise < min_entropy {
                    min_entropy = entropy + noise;
                    argmin = Some((x, y));
                }
            }
        }

        match argmin {
            Some((x, y)) => {
                self.base_mut().collapse(x, y);
                Observation::Collapsed
            }
            None => Observation::Complete,
        }
    }
}
