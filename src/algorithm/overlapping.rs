//! Overlapping-pattern model learned from a sample bitmap
//!
//! Patterns are every `N x N` window of the sample (optionally expanded by
//! dihedral symmetry); two patterns may sit at a relative offset when their
//! windows agree on the overlap. An optional ground pattern is pinned along
//! the bottom row and forbidden everywhere else before generation.

use image::{Rgba, RgbaImage};
use ndarray::Array3;

use crate::algorithm::model::Model;
use crate::algorithm::solver::Solver;
use crate::analysis::palette::SampleGrid;
use crate::analysis::patterns::{compatibility_table, Pattern, PatternSet};
use crate::io::configuration::UNRESOLVED_PIXEL;
use crate::io::error::{invalid_parameter, Result};

/// Construction parameters for the overlapping model
#[derive(Clone, Copy, Debug)]
pub struct OverlappingOptions {
    /// Side length `N` of extracted patterns
    pub pattern_size: usize,
    /// Output width in pixels
    pub output_width: usize,
    /// Output height in pixels
    pub output_height: usize,
    /// Treat the sample as a repeatable texture during extraction
    pub periodic_input: bool,
    /// Generate a toroidally wrapping output
    pub periodic_output: bool,
    /// Number of dihedral orbit members to tally, 1 to 8
    pub symmetry: usize,
    /// Pin the bottom-left sample pattern along the output's bottom row
    pub ground: bool,
}

/// Wave function collapse over patterns extracted from a sample image
pub struct OverlappingModel {
    base: Solver,
    pattern_size: usize,
    colors: Vec<[u8; 4]>,
    patterns: Vec<Pattern>,
    /// `[[t, dx + N - 1, dy + N - 1]]` lists the patterns permitted at that
    /// relative offset from `t`
    compatible: Array3<Vec<usize>>,
    ground: Option<usize>,
    /// Largest top-left corner column of a fully-contained window
    x_bound: usize,
    /// Largest top-left corner row of a fully-contained window
    y_bound: usize,
}

impl OverlappingModel {
    /// Learn a model from a sample image
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern size is less than 2, the output is
    /// smaller than one pattern, the symmetry order is outside `[1, 8]`, the
    /// sample is empty or (non-periodic) smaller than the pattern size, or
    /// the palette is too large to index patterns.
    pub fn new(sample: &RgbaImage, options: OverlappingOptions) -> Result<Self> {
        let n = options.pattern_size;
        if n < 2 {
            return Err(invalid_parameter(
                "pattern_size",
                &n,
                &"patterns must cover at least a 2x2 window",
            ));
        }
        if options.output_width < n || options.output_height < n {
            return Err(invalid_parameter(
                "output size",
                &format!("{}x{}", options.output_width, options.output_height),
                &"output must fit at least one pattern",
            ));
        }

        let grid = SampleGrid::from_image(sample)?;
        let set = PatternSet::extract(
            &grid,
            n,
            options.periodic_input,
            options.symmetry,
            options.ground,
        )?;

        let compatible = compatibility_table(&set.patterns, n);
        let base = Solver::new(
            options.output_width,
            options.output_height,
            set.weights,
            options.periodic_output,
        );

        Ok(Self {
            base,
            pattern_size: n,
            colors: grid.colors().to_vec(),
            patterns: set.patterns,
            compatible,
            ground: set.ground,
            x_bound: options.output_width - n,
            y_bound: options.output_height - n,
        })
    }

    /// Number of unique patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Index of the pinned ground pattern, if one was recorded
    pub const fn ground(&self) -> Option<usize> {
        self.ground
    }

    /// The pattern at index `t`
    pub fn pattern(&self, t: usize) -> &Pattern {
        &self.patterns[t]
    }

    /// Run up to `iterations` cycles and render the current state
    ///
    /// Returns the image, whether the generation finished, and whether it
    /// finished successfully.
    pub fn iterate(&mut self, iterations: usize) -> (RgbaImage, bool, bool) {
        let finished = self.advance(iterations);
        (self.render(), finished, self.is_successful())
    }

    /// Run a complete fresh generation and render the result
    pub fn generate(&mut self) -> (RgbaImage, bool) {
        let successful = self.solve();
        (self.render(), successful)
    }

    /// Render the current wave state
    ///
    /// Collapsed states render each cell's single surviving pattern;
    /// unfinished or contradicted states render a per-pixel average of the
    /// surviving contributors.
    pub fn render(&self) -> RgbaImage {
        if self.is_successful() {
            self.render_complete()
        } else {
            self.render_incomplete()
        }
    }

    fn render_complete(&self) -> RgbaImage {
        let (width, height) = (self.base.width(), self.base.height());
        let mut output = RgbaImage::new(width as u32, height as u32);

        for y in 0..height {
            for x in 0..width {
                let pixel = self
                    .base
                    .wave
                    .first_allowed(x, y)
                    .map_or(UNRESOLVED_PIXEL, |t| self.colors[self.patterns[t][0]]);
                output.put_pixel(x as u32, y as u32, Rgba(pixel));
            }
        }

        output
    }

    fn render_incomplete(&self) -> RgbaImage {
        let n = self.pattern_size;
        let (width, height) = (self.base.width(), self.base.height());
        let mut output = RgbaImage::new(width as u32, height as u32);

        for y in 0..height {
            for x in 0..width {
                let mut contributors: u32 = 0;
                let mut sums = [0u32; 4];

                // Every pattern window covering this pixel contributes the
                // palette entry it would place here
                for dy in 0..n {
                    for dx in 0..n {
                        let mut sx = x as i32 - dx as i32;
                        if sx < 0 {
                            sx += width as i32;
                        }
                        let mut sy = y as i32 - dy as i32;
                        if sy < 0 {
                            sy += height as i32;
                        }

                        let (sx, sy) = (sx as usize, sy as usize);
                        if !self.base.periodic() && (sx > self.x_bound || sy > self.y_bound) {
                            continue;
                        }

                        for t in 0..self.pattern_count() {
                            if self.base.wave.allows(sx, sy, t) {
                                contributors += 1;
                                let color = self.colors[self.patterns[t][dx + dy * n]];
                                for (sum, &channel) in sums.iter_mut().zip(color.iter()) {
                                    *sum += u32::from(channel);
                                }
                            }
                        }
                    }
                }

                let pixel = if contributors == 0 {
                    UNRESOLVED_PIXEL
                } else {
                    [
                        (sums[0] / contributors) as u8,
                        (sums[1] / contributors) as u8,
                        (sums[2] / contributors) as u8,
                        (sums[3] / contributors) as u8,
                    ]
                };
                output.put_pixel(x as u32, y as u32, Rgba(pixel));
            }
        }

        output
    }
}

impl Model for OverlappingModel {
    fn base(&self) -> &Solver {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Solver {
        &mut self.base
    }

    fn on_boundary(&self, x: usize, y: usize) -> bool {
        !self.base.periodic() && (x > self.x_bound || y > self.y_bound)
    }

    fn propagate(&mut self) -> bool {
        let mut change = false;
        let (width, height) = (self.base.width(), self.base.height());
        let n = self.pattern_size as i32;
        let pattern_count = self.pattern_count();

        for x in 0..width {
            for y in 0..height {
                if !self.base.wave.take_changed(x, y) {
                    continue;
                }

                for dx in (1 - n)..n {
                    for dy in (1 - n)..n {
                        let sx = (x as i32 + dx).rem_euclid(width as i32) as usize;
                        let sy = (y as i32 + dy).rem_euclid(height as i32) as usize;

                        if !self.base.periodic() && (sx > self.x_bound || sy > self.y_bound) {
                            continue;
                        }

                        let offset_x = (n - 1 - dx) as usize;
                        let offset_y = (n - 1 - dy) as usize;

                        for t in 0..pattern_count {
                            if !self.base.wave.allows(sx, sy, t) {
                                continue;
                            }

                            // The pattern survives while any pattern it
                            // agrees with at this offset survives at (x, y)
                            let supported = self.compatible[[t, offset_x, offset_y]]
                                .iter()
                                .any(|&t2| self.base.wave.allows(x, y, t2));

                            if !supported {
                                self.base.wave.forbid(sx, sy, t);
                                change = true;
                            }
                        }
                    }
                }
            }
        }

        change
    }

    fn clear(&mut self) {
        self.base.clear_base();

        let Some(ground) = self.ground else {
            return;
        };
        if self.pattern_count() <= 1 {
            return;
        }

        let bottom = self.base.height() - 1;
        for x in 0..self.base.width() {
            for t in 0..self.pattern_count() {
                if t != ground {
                    self.base.wave.forbid(x, bottom, t);
                }
            }
            for y in 0..bottom {
                self.base.wave.forbid(x, y, ground);
            }
        }

        while self.propagate() {}
    }
}
