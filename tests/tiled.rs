//! Validates tile-catalog expansion, adjacency propagation, contradiction
//! handling and subset filtering

use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use wavetile::algorithm::model::Model;
use wavetile::algorithm::tiled::{NeighborRule, SimpleTiledModel, TileCatalog, TileSpec};
use wavetile::io::configuration::UNRESOLVED_PIXEL;
use wavetile::spatial::symmetry::Symmetry;

const BLUE: [u8; 4] = [0, 0, 255, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

fn solid_tile(color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(2, 2, Rgba(color))
}

fn tile(name: &str, symmetry: Symmetry, weight: f64, bitmap: RgbaImage) -> TileSpec {
    TileSpec {
        name: name.to_string(),
        symmetry,
        weight,
        variants: vec![bitmap],
    }
}

fn rule(left: &str, right: &str) -> NeighborRule {
    NeighborRule {
        left: left.to_string(),
        left_index: 0,
        right: right.to_string(),
        right_index: 0,
    }
}

/// Two fully compatible solid tiles; generation can never contradict
fn compatible_pair() -> TileCatalog {
    TileCatalog {
        unique: false,
        tile_size: 2,
        tiles: vec![
            tile("sea", Symmetry::X, 1.0, solid_tile(BLUE)),
            tile("land", Symmetry::X, 3.0, solid_tile(GREEN)),
        ],
        neighbors: vec![
            rule("sea", "sea"),
            rule("land", "land"),
            rule("sea", "land"),
            rule("land", "sea"),
        ],
        subsets: HashMap::from([("water".to_string(), vec!["sea".to_string()])]),
    }
}

/// Two tiles with no adjacency at all; the first collapse starves every
/// other cell
fn incompatible_pair() -> TileCatalog {
    TileCatalog {
        unique: false,
        tile_size: 2,
        tiles: vec![
            tile("sea", Symmetry::X, 1.0, solid_tile(BLUE)),
            tile("land", Symmetry::X, 1.0, solid_tile(GREEN)),
        ],
        neighbors: vec![],
        subsets: HashMap::new(),
    }
}

#[test]
fn test_generation_completes_and_respects_adjacency() {
    let catalog = compatible_pair();
    let mut model = SimpleTiledModel::new(&catalog, None, 6, 6, false).unwrap();
    model.set_seed(42);

    let (image, successful) = model.generate();
    assert!(successful);
    assert_eq!(image.dimensions(), (12, 12));

    for x in 0..6 {
        for y in 0..6 {
            assert_eq!(model.base().allowed_count(x, y), 1, "cell ({x}, {y})");
        }
    }

    // Every horizontal and vertical pair of survivors must be a permitted
    // adjacency
    for x in 0..6usize {
        for y in 0..6usize {
            let here = (0..model.tile_count())
                .find(|&t| model.base().allows(x, y, t))
                .unwrap();
            if x > 0 {
                let left = (0..model.tile_count())
                    .find(|&t| model.base().allows(x - 1, y, t))
                    .unwrap();
                assert!(model.compatible(0, here, left));
            }
            if y + 1 < 6 {
                let below = (0..model.tile_count())
                    .find(|&t| model.base().allows(x, y + 1, t))
                    .unwrap();
                assert!(model.compatible(1, here, below));
            }
        }
    }

    // Output pixels come straight from the tile bitmaps
    for pixel in image.pixels() {
        assert!(pixel.0 == BLUE || pixel.0 == GREEN);
    }
}

#[test]
fn test_generation_is_deterministic_for_a_fixed_seed() {
    let catalog = compatible_pair();
    let mut first = SimpleTiledModel::new(&catalog, None, 6, 6, true).unwrap();
    let mut second = SimpleTiledModel::new(&catalog, None, 6, 6, true).unwrap();
    first.set_seed(42);
    second.set_seed(42);

    let (image_a, success_a) = first.generate();
    let (image_b, success_b) = second.generate();

    assert!(success_a && success_b);
    assert_eq!(image_a.as_raw(), image_b.as_raw());
}

#[test]
fn test_bounded_iteration_leaves_undetermined_cells_grey() {
    let catalog = compatible_pair();
    let mut model = SimpleTiledModel::new(&catalog, None, 6, 6, false).unwrap();
    model.set_seed(42);

    // Nothing forces extra collapses here, so five cycles collapse exactly
    // five of the thirty-six cells
    let (image, finished, successful) = model.iterate(5);
    assert!(!finished);
    assert!(!successful);
    assert_eq!(image.dimensions(), (12, 12));

    let grey = image
        .pixels()
        .filter(|pixel| pixel.0 == UNRESOLVED_PIXEL)
        .count();
    let collapsed = image
        .pixels()
        .filter(|pixel| pixel.0 == BLUE || pixel.0 == GREEN)
        .count();

    // 31 undetermined cells of 4 pixels each, 5 collapsed ones
    assert_eq!(grey, 31 * 4);
    assert_eq!(collapsed, 5 * 4);
}

#[test]
fn test_contradiction_finishes_unsuccessfully_with_partial_render() {
    let catalog = incompatible_pair();
    let mut model = SimpleTiledModel::new(&catalog, None, 4, 4, false).unwrap();
    model.set_seed(42);

    let (image, successful) = model.generate();
    assert!(!successful);
    assert!(!model.is_successful());
    assert_eq!(image.dimensions(), (8, 8));

    // The starvation cascades through the whole field, including back into
    // the collapsed cell; every starved cell renders grey
    for pixel in image.pixels() {
        assert_eq!(pixel.0, UNRESOLVED_PIXEL);
    }
}

#[test]
fn test_single_symmetric_tile_is_trivially_complete() {
    // One X tile: a single variant, one action row, and a zero-entropy field
    // that completes immediately
    let catalog = TileCatalog {
        unique: false,
        tile_size: 2,
        tiles: vec![tile("sea", Symmetry::X, 1.0, solid_tile(BLUE))],
        neighbors: vec![rule("sea", "sea")],
        subsets: HashMap::new(),
    };

    let mut model = SimpleTiledModel::new(&catalog, None, 3, 3, false).unwrap();
    assert_eq!(model.tile_count(), 1);
    assert!(model.compatible(0, 0, 0));
    assert!(model.compatible(1, 0, 0));
    assert!(model.compatible(2, 0, 0));
    assert!(model.compatible(3, 0, 0));

    model.set_seed(42);
    let (image, successful) = model.generate();
    assert!(successful);
    for pixel in image.pixels() {
        assert_eq!(pixel.0, BLUE);
    }
}

#[test]
fn test_l_class_tile_expands_to_four_rotations() {
    // An asymmetric bitmap so each synthetic rotation is distinct
    let mut bitmap = RgbaImage::from_pixel(2, 2, Rgba(BLUE));
    bitmap.put_pixel(0, 0, Rgba(GREEN));

    let catalog = TileCatalog {
        unique: false,
        tile_size: 2,
        tiles: vec![tile("corner", Symmetry::L, 1.0, bitmap)],
        neighbors: vec![],
        subsets: HashMap::new(),
    };

    let model = SimpleTiledModel::new(&catalog, None, 2, 2, false).unwrap();
    assert_eq!(model.tile_count(), 4);

    // Each variant is the previous one turned a quarter; the green corner
    // walks top-left, bottom-left, bottom-right, top-right
    assert_eq!(model.tile_pixels(0)[0], GREEN);
    assert_eq!(model.tile_pixels(1)[2], GREEN);
    assert_eq!(model.tile_pixels(2)[3], GREEN);
    assert_eq!(model.tile_pixels(3)[1], GREEN);
}

#[test]
fn test_subset_restricts_tiles_and_rules() {
    let catalog = compatible_pair();

    let model = SimpleTiledModel::new(&catalog, Some("water"), 3, 3, false).unwrap();
    assert_eq!(model.tile_count(), 1);

    assert!(SimpleTiledModel::new(&catalog, Some("missing"), 3, 3, false).is_err());
}

#[test]
fn test_construction_rejects_inconsistent_catalogs() {
    // Neighbor rule naming an undeclared tile
    let mut catalog = compatible_pair();
    catalog.neighbors.push(rule("sea", "mountain"));
    assert!(SimpleTiledModel::new(&catalog, None, 3, 3, false).is_err());

    // Negative weight
    let mut catalog = compatible_pair();
    catalog.tiles[0].weight = -1.0;
    assert!(SimpleTiledModel::new(&catalog, None, 3, 3, false).is_err());

    // Unique tile without the full set of variant bitmaps
    let catalog = TileCatalog {
        unique: true,
        tile_size: 2,
        tiles: vec![tile("line", Symmetry::I, 1.0, solid_tile(BLUE))],
        neighbors: vec![],
        subsets: HashMap::new(),
    };
    assert!(SimpleTiledModel::new(&catalog, None, 3, 3, false).is_err());

    // Bitmap that does not match the declared tile size
    let catalog = TileCatalog {
        unique: false,
        tile_size: 4,
        tiles: vec![tile("sea", Symmetry::X, 1.0, solid_tile(BLUE))],
        neighbors: vec![],
        subsets: HashMap::new(),
    };
    assert!(SimpleTiledModel::new(&catalog, None, 3, 3, false).is_err());

    // Orientation index beyond the eight symmetry operations
    let mut catalog = compatible_pair();
    catalog.neighbors[0].left_index = 8;
    assert!(SimpleTiledModel::new(&catalog, None, 3, 3, false).is_err());
}

#[test]
fn test_render_before_any_cycle_is_fully_grey() {
    let catalog = compatible_pair();
    let model = SimpleTiledModel::new(&catalog, None, 3, 3, false).unwrap();

    let image = model.render();
    assert_eq!(image.dimensions(), (6, 6));
    for pixel in image.pixels() {
        assert_eq!(pixel.0, UNRESOLVED_PIXEL);
    }
}
