//! Algorithm constants and runtime configuration defaults

/// Scale of the tie-breaking noise added to cell entropy during observation
///
/// Small enough to never reorder cells whose entropies genuinely differ for
/// realistic pattern counts, large enough to break exact ties
pub const ENTROPY_NOISE_SCALE: f64 = 1e-6;

/// Pixel emitted for output positions with no surviving contributors
pub const UNRESOLVED_PIXEL: [u8; 4] = [127, 127, 127, 255];

/// Highest symmetry order of the dihedral orbit (4 rotations x 2 reflections)
pub const MAX_SYMMETRY: usize = 8;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default side length of extracted patterns
pub const DEFAULT_PATTERN_SIZE: usize = 3;

/// Default output width and height in cells
pub const DEFAULT_OUTPUT_SIZE: usize = 48;

/// Default tile side length in pixels for tile catalogs
pub const DEFAULT_TILE_SIZE: usize = 16;

/// Default symmetry order for pattern extraction
pub const DEFAULT_SYMMETRY: usize = 8;

/// Default number of fresh-seed attempts after a contradiction
pub const DEFAULT_RETRIES: usize = 10;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";

/// How often the progress display refreshes, in collapse steps
pub const PROGRESS_UPDATE_INTERVAL: usize = 16;
