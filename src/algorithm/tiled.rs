//! Tile-catalog model with declared adjacency and symmetry
//!
//! Each declared tile expands into its symmetry-class variants; neighbor
//! rules declared between left/right orientation pairs are rotated into all
//! four directions and symmetrized. Propagation walks the four cardinal
//! neighbors of every cell.

use image::{Rgba, RgbaImage};
use ndarray::Array3;
use std::collections::HashMap;

use crate::algorithm::model::Model;
use crate::algorithm::solver::Solver;
use crate::io::configuration::UNRESOLVED_PIXEL;
use crate::io::error::{invalid_parameter, GenerationError, Result};
use crate::spatial::symmetry::{orientation_actions, Symmetry};

/// One declared tile before symmetry expansion
pub struct TileSpec {
    /// Name referenced by neighbor rules and subsets
    pub name: String,
    /// Shape-symmetry class
    pub symmetry: Symmetry,
    /// Stationary weight shared by all variants
    pub weight: f64,
    /// One bitmap per variant when unique, a single bitmap otherwise
    pub variants: Vec<RgbaImage>,
}

/// A declared left/right adjacency between tile orientations
pub struct NeighborRule {
    /// Left tile name
    pub left: String,
    /// Orientation index of the left tile, 0 to 7
    pub left_index: usize,
    /// Right tile name
    pub right: String,
    /// Orientation index of the right tile, 0 to 7
    pub right_index: usize,
}

/// A full tile catalog: tiles, adjacency rules and optional subsets
pub struct TileCatalog {
    /// Whether tiles supply their own variant bitmaps
    pub unique: bool,
    /// Tile side length in pixels
    pub tile_size: usize,
    /// Declared tiles
    pub tiles: Vec<TileSpec>,
    /// Declared adjacencies
    pub neighbors: Vec<NeighborRule>,
    /// Named tile subsets for restricted generations
    pub subsets: HashMap<String, Vec<String>>,
}

/// Directions of the adjacency table: left, down, right, up
const DIRECTIONS: usize = 4;

/// Wave function collapse over a catalog of tiles
pub struct SimpleTiledModel {
    base: Solver,
    tile_size: usize,
    /// Flat `tile_size * tile_size` bitmap per expanded variant
    tiles: Vec<Vec<[u8; 4]>>,
    /// `[[direction, t, neighbor]]`; direction 0 looks left, 1 down, 2
    /// right, 3 up
    compatible: Array3<bool>,
}

impl SimpleTiledModel {
    /// Expand a catalog into a model for a `width x height` tile grid
    ///
    /// `subset` restricts the catalog to the named subset's tiles; neighbor
    /// rules touching excluded tiles are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty or inconsistent catalog: zero tile size,
    /// negative weight, missing or miscounted variant bitmaps, bitmaps that
    /// are not `tile_size` square, neighbor rules or subsets referencing
    /// unknown tiles, or orientation indices outside `[0, 8)`.
    pub fn new(
        catalog: &TileCatalog,
        subset: Option<&str>,
        width: usize,
        height: usize,
        periodic: bool,
    ) -> Result<Self> {
        let tile_size = catalog.tile_size;
        if tile_size == 0 {
            return Err(invalid_parameter(
                "tile_size",
                &tile_size,
                &"tiles must be at least one pixel",
            ));
        }

        let members = match subset {
            Some(name) => Some(
                catalog
                    .subsets
                    .get(name)
                    .ok_or_else(|| GenerationError::UnknownTile {
                        name: name.to_string(),
                    })?,
            ),
            None => None,
        };
        let included =
            |name: &str| members.is_none_or(|list| list.iter().any(|member| member == name));

        let mut first_occurrence: HashMap<&str, usize> = HashMap::new();
        let mut action: Vec<[usize; 8]> = Vec::new();
        let mut tiles: Vec<Vec<[u8; 4]>> = Vec::new();
        let mut stationary: Vec<f64> = Vec::new();

        for declared in &catalog.tiles {
            if !included(&declared.name) {
                continue;
            }
            if declared.weight < 0.0 {
                return Err(invalid_parameter(
                    "weight",
                    &declared.weight,
                    &format!("tile '{}' has a negative weight", declared.name),
                ));
            }

            let cardinality = declared.symmetry.cardinality();
            let base_index = action.len();
            first_occurrence.insert(&declared.name, base_index);
            action.extend(orientation_actions(declared.symmetry, base_index));

            if catalog.unique {
                if declared.variants.len() != cardinality {
                    return Err(invalid_parameter(
                        "variants",
                        &declared.variants.len(),
                        &format!(
                            "unique tile '{}' must supply {cardinality} bitmaps",
                            declared.name
                        ),
                    ));
                }
                for variant in &declared.variants {
                    tiles.push(flatten(variant, tile_size, &declared.name)?);
                }
            } else {
                let first = declared.variants.first().ok_or_else(|| {
                    invalid_parameter(
                        "variants",
                        &0,
                        &format!("tile '{}' supplies no bitmap", declared.name),
                    )
                })?;
                tiles.push(flatten(first, tile_size, &declared.name)?);
                // Later variants are quarter rotations of the one before
                for _ in 1..cardinality {
                    let rotated = rotate_pixels(&tiles[tiles.len() - 1], tile_size);
                    tiles.push(rotated);
                }
            }

            for _ in 0..cardinality {
                stationary.push(declared.weight);
            }
        }

        let variant_count = action.len();
        if variant_count == 0 {
            return Err(invalid_parameter(
                "tiles",
                &0,
                &"catalog declares no usable tiles",
            ));
        }

        let mut compatible = Array3::from_elem((DIRECTIONS, variant_count, variant_count), false);

        for rule in &catalog.neighbors {
            if !included(&rule.left) || !included(&rule.right) {
                continue;
            }
            if rule.left_index >= 8 || rule.right_index >= 8 {
                return Err(invalid_parameter(
                    "neighbor orientation",
                    &rule.left_index.max(rule.right_index),
                    &"orientation indices run from 0 to 7",
                ));
            }

            let left_base = *first_occurrence.get(rule.left.as_str()).ok_or_else(|| {
                GenerationError::UnknownTile {
                    name: rule.left.clone(),
                }
            })?;
            let right_base = *first_occurrence.get(rule.right.as_str()).ok_or_else(|| {
                GenerationError::UnknownTile {
                    name: rule.right.clone(),
                }
            })?;

            let l = action[left_base][rule.left_index];
            let r = action[right_base][rule.right_index];
            let d = action[l][1];
            let u = action[r][1];

            // The declared left/right relation and its three rotations
            compatible[[0, r, l]] = true;
            compatible[[0, action[r][6], action[l][6]]] = true;
            compatible[[0, action[l][4], action[r][4]]] = true;
            compatible[[0, action[l][2], action[r][2]]] = true;

            compatible[[1, u, d]] = true;
            compatible[[1, action[d][6], action[u][6]]] = true;
            compatible[[1, action[u][4], action[d][4]]] = true;
            compatible[[1, action[d][2], action[u][2]]] = true;
        }

        // Right and up mirror left and down with the roles swapped
        for t in 0..variant_count {
            for t2 in 0..variant_count {
                compatible[[2, t, t2]] = compatible[[0, t2, t]];
                compatible[[3, t, t2]] = compatible[[1, t2, t]];
            }
        }

        Ok(Self {
            base: Solver::new(width, height, stationary, periodic),
            tile_size,
            tiles,
            compatible,
        })
    }

    /// Number of expanded tile variants
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tile side length in pixels
    pub const fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Flat pixel data of variant `t`
    pub fn tile_pixels(&self, t: usize) -> &[[u8; 4]] {
        &self.tiles[t]
    }

    /// Whether variant `t` tolerates `neighbor` in the given direction
    /// (0 left, 1 down, 2 right, 3 up)
    pub fn compatible(&self, direction: usize, t: usize, neighbor: usize) -> bool {
        self.compatible[[direction, t, neighbor]]
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

    /// Render the current wave state at `tile_size` pixels per cell
    pub fn render(&self) -> RgbaImage {
        if self.is_successful() {
            self.render_complete()
        } else {
            self.render_incomplete()
        }
    }

    fn render_complete(&self) -> RgbaImage {
        let ts = self.tile_size;
        let (width, height) = (self.base.width(), self.base.height());
        let mut output = RgbaImage::new((width * ts) as u32, (height * ts) as u32);

        for y in 0..height {
            for x in 0..width {
                let Some(t) = self.base.wave.first_allowed(x, y) else {
                    continue;
                };
                for yt in 0..ts {
                    for xt in 0..ts {
                        let pixel = self.tiles[t][xt + yt * ts];
                        output.put_pixel((x * ts + xt) as u32, (y * ts + yt) as u32, Rgba(pixel));
                    }
                }
            }
        }

        output
    }

    fn render_incomplete(&self) -> RgbaImage {
        let ts = self.tile_size;
        let (width, height) = (self.base.width(), self.base.height());
        let variant_count = self.tile_count();
        let mut output = RgbaImage::new((width * ts) as u32, (height * ts) as u32);

        for y in 0..height {
            for x in 0..width {
                let amount = self.base.wave.allowed_count(x, y);
                let weight_sum: f64 = (0..variant_count)
                    .filter(|&t| self.base.wave.allows(x, y, t))
                    .map(|t| self.base.stationary[t])
                    .sum();

                // Fully undetermined and fully contradicted cells both render
                // as the unresolved grey
                let undetermined = amount == variant_count || amount == 0 || weight_sum <= 0.0;

                for yt in 0..ts {
                    for xt in 0..ts {
                        let pixel = if undetermined {
                            UNRESOLVED_PIXEL
                        } else {
                            let mut sums = [0.0f64; 4];
                            for t in 0..variant_count {
                                if self.base.wave.allows(x, y, t) {
                                    let color = self.tiles[t][xt + yt * ts];
                                    for (sum, &channel) in sums.iter_mut().zip(color.iter()) {
                                        *sum += f64::from(channel) * self.base.stationary[t];
                                    }
                                }
                            }
                            [
                                (sums[0] / weight_sum) as u8,
                                (sums[1] / weight_sum) as u8,
                                (sums[2] / weight_sum) as u8,
                                (sums[3] / weight_sum) as u8,
                            ]
                        };
                        output.put_pixel((x * ts + xt) as u32, (y * ts + yt) as u32, Rgba(pixel));
                    }
                }
            }
        }

        output
    }
}

impl Model for SimpleTiledModel {
    fn base(&self) -> &Solver {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Solver {
        &mut self.base
    }

    fn on_boundary(&self, _x: usize, _y: usize) -> bool {
        false
    }

    fn propagate(&mut self) -> bool {
        let mut change = false;
        let (width, height) = (self.base.width(), self.base.height());
        let variant_count = self.tile_count();

        for x2 in 0..width {
            for y2 in 0..height {
                for direction in 0..DIRECTIONS {
                    // Cardinal neighbor the constraint flows from; skipped at
                    // hard edges, wrapped on periodic output
                    let neighbor = match direction {
                        0 => {
                            if x2 == 0 {
                                if !self.base.periodic() {
                                    continue;
                                }
                                (width - 1, y2)
                            } else {
                                (x2 - 1, y2)
                            }
                        }
                        1 => {
                            if y2 == height - 1 {
                                if !self.base.periodic() {
                                    continue;
                                }
                                (x2, 0)
                            } else {
                                (x2, y2 + 1)
                            }
                        }
                        2 => {
                            if x2 == width - 1 {
                                if !self.base.periodic() {
                                    continue;
                                }
                                (0, y2)
                            } else {
                                (x2 + 1, y2)
                            }
                        }
                        _ => {
                            if y2 == 0 {
                                if !self.base.periodic() {
                                    continue;
                                }
                                (x2, height - 1)
                            } else {
                                (x2, y2 - 1)
                            }
                        }
                    };
                    let (x1, y1) = neighbor;

                    if !self.base.wave.is_changed(x1, y1) {
                        continue;
                    }

                    for t2 in 0..variant_count {
                        if !self.base.wave.allows(x2, y2, t2) {
                            continue;
                        }

                        let supported = (0..variant_count).any(|t1| {
                            self.base.wave.allows(x1, y1, t1)
                                && self.compatible[[direction, t2, t1]]
                        });

                        if !supported {
                            self.base.wave.forbid(x2, y2, t2);
                            change = true;
                        }
                    }
                }
            }
        }

        change
    }

    fn clear(&mut self) {
        self.base.clear_base();
    }
}

/// Flatten a variant bitmap into row-major pixels, validating its size
fn flatten(bitmap: &RgbaImage, tile_size: usize, name: &str) -> Result<Vec<[u8; 4]>> {
    let (width, height) = bitmap.dimensions();
    if width as usize != tile_size || height as usize != tile_size {
        return Err(invalid_parameter(
            "bitmap",
            &format!("{width}x{height}"),
            &format!("tile '{name}' bitmaps must be {tile_size}x{tile_size}"),
        ));
    }

    let mut pixels = Vec::with_capacity(tile_size * tile_size);
    for y in 0..tile_size {
        for x in 0..tile_size {
            pixels.push(bitmap.get_pixel(x as u32, y as u32).0);
        }
    }
    Ok(pixels)
}

/// Quarter rotation of a flat tile bitmap
fn rotate_pixels(pixels: &[[u8; 4]], tile_size: usize) -> Vec<[u8; 4]> {
    let mut rotated = Vec::with_capacity(tile_size * tile_size);
    for y in 0..tile_size {
        for x in 0..tile_size {
            rotated.push(pixels[tile_size - 1 - y + x * tile_size]);
        }
    }
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_pixels_quarter_turn() {
        // 2x2 bitmap [a b / c d] turns into [b d / a c]
        let a = [1, 0, 0, 255];
        let b = [2, 0, 0, 255];
        let c = [3, 0, 0, 255];
        let d = [4, 0, 0, 255];

        let rotated = rotate_pixels(&[a, b, c, d], 2);
        assert_eq!(rotated, vec![b, d, a, c]);
    }

    #[test]
    fn test_four_rotations_restore_the_bitmap() {
        let pixels: Vec<[u8; 4]> = (0..9u8).map(|v| [v, 0, 0, 255]).collect();
        let mut turned = pixels.clone();
        for _ in 0..4 {
            turned = rotate_pixels(&turned, 3);
        }
        assert_eq!(turned, pixels);
    }
}
