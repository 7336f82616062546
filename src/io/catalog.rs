//! Tile catalog JSON parsing and bitmap loading
//!
//! The on-disk format carries tile metadata only; bitmaps are loaded by tile
//! name from the directory the catalog's `path` field points at, relative to
//! the catalog file. Unique tiles store one file per variant, named
//! `<name> <variant>.png`; all other tiles store a single `<name>.png`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::algorithm::tiled::{NeighborRule, TileCatalog, TileSpec};
use crate::io::configuration::DEFAULT_TILE_SIZE;
use crate::io::error::{GenerationError, Result};
use crate::io::image::load_rgba;
use crate::spatial::symmetry::Symmetry;

/// Catalog file as stored on disk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    /// Directory holding the tile bitmaps, relative to the catalog file
    #[serde(default)]
    pub path: String,
    /// Whether tiles supply their own variant bitmaps
    #[serde(default)]
    pub unique: bool,
    /// Tile side length in pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: usize,
    /// Declared tiles
    pub tiles: Vec<CatalogTile>,
    /// Declared adjacencies
    #[serde(default)]
    pub neighbors: Vec<CatalogNeighbor>,
    /// Named tile subsets
    #[serde(default)]
    pub subsets: HashMap<String, Vec<String>>,
}

/// Tile metadata as stored on disk
#[derive(Debug, Deserialize)]
pub struct CatalogTile {
    /// Name used to identify the tile and its bitmap files
    pub name: String,
    /// Symmetry class code; empty or unknown codes mean fully symmetric
    #[serde(default)]
    pub symmetry: String,
    /// Stationary weight
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Adjacency declaration as stored on disk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogNeighbor {
    /// Left tile name
    pub left: String,
    /// Orientation index of the left tile
    #[serde(default)]
    pub left_num: usize,
    /// Right tile name
    pub right: String,
    /// Orientation index of the right tile
    #[serde(default)]
    pub right_num: usize,
}

fn default_tile_size() -> usize {
    DEFAULT_TILE_SIZE
}

fn default_weight() -> f64 {
    1.0
}

/// Parse catalog JSON without touching the filesystem
///
/// # Errors
///
/// Returns an error if the text is not valid catalog JSON.
pub fn parse_catalog(json: &str) -> Result<CatalogFile> {
    serde_json::from_str(json).map_err(|source| GenerationError::CatalogParse {
        path: "<inline>".into(),
        source,
    })
}

/// Load a catalog file and every tile bitmap it references
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if any referenced
/// bitmap fails to load.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<TileCatalog> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GenerationError::FileSystem {
        path: path.to_path_buf(),
        operation: "read catalog",
        source,
    })?;

    let file: CatalogFile =
        serde_json::from_str(&text).map_err(|source| GenerationError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;

    let bitmap_dir = path
        .parent()
        .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf)
        .join(&file.path);

    let mut tiles = Vec::with_capacity(file.tiles.len());
    for tile in &file.tiles {
        let symmetry = Symmetry::from_code(&tile.symmetry);

        let variants = if file.unique {
            let mut variants = Vec::with_capacity(symmetry.cardinality());
            for variant in 0..symmetry.cardinality() {
                let bitmap_path = bitmap_dir.join(format!("{} {variant}.png", tile.name));
                variants.push(load_rgba(bitmap_path)?);
            }
            variants
        } else {
            vec![load_rgba(bitmap_dir.join(format!("{}.png", tile.name)))?]
        };

        tiles.push(TileSpec {
            name: tile.name.clone(),
            symmetry,
            weight: tile.weight,
            variants,
        });
    }

    let neighbors = file
        .neighbors
        .iter()
        .map(|neighbor| NeighborRule {
            left: neighbor.left.clone(),
            left_index: neighbor.left_num,
            right: neighbor.right.clone(),
            right_index: neighbor.right_num,
        })
        .collect();

    Ok(TileCatalog {
        unique: file.unique,
        tile_size: file.tile_size,
        tiles,
        neighbors,
        subsets: file.subsets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_documented_format() {
        let file = parse_catalog(
            r#"{
                "path": "castle/",
                "tiles": [{ "name": "wall" }],
                "neighbors": [{ "left": "wall", "right": "wall" }]
            }"#,
        )
        .unwrap();

        assert!(!file.unique);
        assert_eq!(file.tile_size, 16);
        assert_eq!(file.tiles[0].symmetry, "");
        assert!((file.tiles[0].weight - 1.0).abs() < f64::EPSILON);
        assert_eq!(file.neighbors[0].left_num, 0);
        assert_eq!(file.neighbors[0].right_num, 0);
        assert!(file.subsets.is_empty());
    }

    #[test]
    fn test_explicit_fields_round_trip() {
        let file = parse_catalog(
            r#"{
                "unique": true,
                "tileSize": 8,
                "tiles": [
                    { "name": "corner", "symmetry": "L", "weight": 0.5 },
                    { "name": "line", "symmetry": "I" }
                ],
                "neighbors": [
                    { "left": "corner", "leftNum": 1, "right": "line", "rightNum": 0 }
                ],
                "subsets": { "walls": ["corner"] }
            }"#,
        )
        .unwrap();

        assert!(file.unique);
        assert_eq!(file.tile_size, 8);
        assert_eq!(file.tiles.len(), 2);
        assert_eq!(file.neighbors[0].left_num, 1);
        assert_eq!(file.subsets["walls"], vec!["corner".to_string()]);
    }

    #[test]
    fn test_malformed_json_is_reported() {
        assert!(parse_catalog("{ not json").is_err());
    }
}
