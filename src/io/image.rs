//! PNG loading and saving with contextual errors

use image::RgbaImage;
use std::path::Path;

use crate::io::error::{GenerationError, Result};

/// Load an image from disk and convert it to RGBA
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not a decodable image.
pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| GenerationError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Save an image as PNG, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the image
/// cannot be encoded and written.
pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| GenerationError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source,
            })?;
        }
    }

    image.save(path).map_err(|source| GenerationError::ImageExport {
        path: path.to_path_buf(),
        source,
    })
}
