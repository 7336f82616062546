//! Performance measurement for complete generations of both models

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::hint::black_box;
use wavetile::algorithm::model::Model;
use wavetile::algorithm::overlapping::{OverlappingModel, OverlappingOptions};
use wavetile::algorithm::tiled::{NeighborRule, SimpleTiledModel, TileCatalog, TileSpec};
use wavetile::spatial::symmetry::Symmetry;

fn checkerboard_sample(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// Measures a full overlapping generation over a 16x16 output
fn bench_overlapping_generate(c: &mut Criterion) {
    let sample = checkerboard_sample(4);
    let options = OverlappingOptions {
        pattern_size: 2,
        output_width: 16,
        output_height: 16,
        periodic_input: true,
        periodic_output: true,
        symmetry: 1,
        ground: false,
    };

    c.bench_function("overlapping_generate_16", |b| {
        b.iter(|| {
            let Ok(mut model) = OverlappingModel::new(&sample, options) else {
                return;
            };
            model.set_seed(12345);
            let (image, successful) = model.generate();
            black_box((image, successful));
        });
    });
}

/// Measures a full tiled generation over an 8x8 grid of two tiles
fn bench_tiled_generate(c: &mut Criterion) {
    let solid = |color: [u8; 4]| RgbaImage::from_pixel(4, 4, Rgba(color));
    let tile = |name: &str, bitmap: RgbaImage| TileSpec {
        name: name.to_string(),
        symmetry: Symmetry::X,
        weight: 1.0,
        variants: vec![bitmap],
    };
    let rule = |left: &str, right: &str| NeighborRule {
        left: left.to_string(),
        left_index: 0,
        right: right.to_string(),
        right_index: 0,
    };

    let catalog = TileCatalog {
        unique: false,
        tile_size: 4,
        tiles: vec![
            tile("sea", solid([0, 0, 255, 255])),
            tile("land", solid([0, 255, 0, 255])),
        ],
        neighbors: vec![
            rule("sea", "sea"),
            rule("land", "land"),
            rule("sea", "land"),
            rule("land", "sea"),
        ],
        subsets: HashMap::new(),
    };

    c.bench_function("tiled_generate_8", |b| {
        b.iter(|| {
            let Ok(mut model) = SimpleTiledModel::new(&catalog, None, 8, 8, true) else {
                return;
            };
            model.set_seed(12345);
            let (image, successful) = model.generate();
            black_box((image, successful));
        });
    });
}

criterion_group!(benches, bench_overlapping_generate, bench_tiled_generate);
criterion_main!(benches);
