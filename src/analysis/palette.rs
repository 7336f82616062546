//! Palette extraction and sample re-encoding
//!
//! Distinct colors are numbered in the order they are first encountered
//! (scanning rows top to bottom) and the sample is re-expressed as a grid of
//! palette indices. The encounter order is load-bearing: pattern indices and
//! therefore the whole enumeration downstream depend on it.

use image::RgbaImage;
use ndarray::Array2;
use std::collections::HashMap;

use crate::io::error::{invalid_source, Result};

/// A sample bitmap re-encoded against its own palette
#[derive(Debug, Clone)]
pub struct SampleGrid {
    /// Palette index per sample pixel, indexed `[[x, y]]`
    indices: Array2<usize>,
    /// Distinct colors in first-seen order
    colors: Vec<[u8; 4]>,
}

impl SampleGrid {
    /// Number a sample's distinct colors and re-encode its pixels
    ///
    /// # Errors
    ///
    /// Returns an error if the sample has no pixels.
    pub fn from_image(sample: &RgbaImage) -> Result<Self> {
        let (width, height) = sample.dimensions();
        if width == 0 || height == 0 {
            return Err(invalid_source(&"sample image is empty"));
        }

        let mut colors: Vec<[u8; 4]> = Vec::new();
        let mut numbering: HashMap<[u8; 4], usize> = HashMap::new();
        let mut indices = Array2::zeros((width as usize, height as usize));

        for y in 0..height {
            for x in 0..width {
                let pixel = sample.get_pixel(x, y).0;
                let index = *numbering.entry(pixel).or_insert_with(|| {
                    colors.push(pixel);
                    colors.len() - 1
                });
                indices[[x as usize, y as usize]] = index;
            }
        }

        Ok(Self { indices, colors })
    }

    /// Sample width in pixels
    pub fn width(&self) -> usize {
        self.indices.dim().0
    }

    /// Sample height in pixels
    pub fn height(&self) -> usize {
        self.indices.dim().1
    }

    /// Number of distinct colors
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// The palette in first-seen order
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Palette index at `(x, y)` with wrapping in both axes
    #[inline]
    pub fn index_wrapped(&self, x: usize, y: usize) -> usize {
        self.indices[[x % self.width(), y % self.height()]]
    }
}
