//! Command-line interface for generating textures from samples and catalogs

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::algorithm::model::Model;
use crate::algorithm::overlapping::{OverlappingModel, OverlappingOptions};
use crate::algorithm::tiled::SimpleTiledModel;
use crate::io::catalog::load_catalog;
use crate::io::configuration::{
    DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_RETRIES, DEFAULT_SEED, DEFAULT_SYMMETRY,
    OUTPUT_SUFFIX, PROGRESS_UPDATE_INTERVAL,
};
use crate::io::error::Result;
use crate::io::image::{load_rgba, save_png};
use crate::io::progress::GenerationProgress;

#[derive(Parser)]
#[command(name = "wavetile")]
#[command(
    author,
    version,
    about = "Generate textures and tile maps with wave function collapse"
)]
/// Command-line arguments for the generation tool
pub struct Cli {
    /// Model to run
    #[command(subcommand)]
    pub command: Command,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum observe/propagate cycles per attempt (0 runs to completion)
    #[arg(short, long, default_value_t = 0)]
    pub iterations: usize,

    /// Fresh-seed attempts after a contradiction
    #[arg(short, long, default_value_t = DEFAULT_RETRIES)]
    pub retries: usize,

    /// Output PNG path (defaults to the input name plus a suffix)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Input-specific model selection
#[derive(Subcommand)]
pub enum Command {
    /// Learn patterns from a sample bitmap
    Overlapping {
        /// Sample PNG to learn from
        sample: PathBuf,

        /// Side length of extracted patterns
        #[arg(short = 'n', long, default_value_t = DEFAULT_PATTERN_SIZE)]
        pattern_size: usize,

        /// Output width in pixels
        #[arg(short, long, default_value_t = DEFAULT_OUTPUT_SIZE)]
        width: usize,

        /// Output height in pixels
        #[arg(short = 'H', long, default_value_t = DEFAULT_OUTPUT_SIZE)]
        height: usize,

        /// Treat the sample as a repeatable texture
        #[arg(long)]
        periodic_input: bool,

        /// Generate a repeatable texture
        #[arg(long)]
        periodic_output: bool,

        /// Symmetry variants to learn per pattern (1 to 8)
        #[arg(long, default_value_t = DEFAULT_SYMMETRY)]
        symmetry: usize,

        /// Pin the sample's bottom-left pattern along the bottom row
        #[arg(long)]
        ground: bool,
    },

    /// Assemble tiles from a catalog with declared adjacency
    Tiled {
        /// Catalog JSON describing tiles and neighbors
        catalog: PathBuf,

        /// Output width in tiles
        #[arg(short, long, default_value_t = DEFAULT_OUTPUT_SIZE)]
        width: usize,

        /// Output height in tiles
        #[arg(short = 'H', long, default_value_t = DEFAULT_OUTPUT_SIZE)]
        height: usize,

        /// Generate a repeatable tile map
        #[arg(long)]
        periodic: bool,

        /// Restrict generation to a named tile subset
        #[arg(long)]
        subset: Option<String>,
    },
}

/// Builds the requested model and drives generation attempts
pub struct Runner {
    cli: Cli,
    progress: Option<GenerationProgress>,
}

impl Runner {
    /// Create a runner for parsed arguments
    pub fn new(cli: Cli) -> Self {
        let progress = (!cli.quiet).then(GenerationProgress::new);
        Self { cli, progress }
    }

    /// Run the generation and write the output image
    ///
    /// # Errors
    ///
    /// Returns an error if inputs cannot be loaded, the model cannot be
    /// constructed, or the output cannot be written.
    pub fn process(&mut self) -> Result<()> {
        let (input, image, successful) = match &self.cli.command {
            Command::Overlapping {
                sample,
                pattern_size,
                width,
                height,
                periodic_input,
                periodic_output,
                symmetry,
                ground,
            } => {
                let bitmap = load_rgba(sample)?;
                let options = OverlappingOptions {
                    pattern_size: *pattern_size,
                    output_width: *width,
                    output_height: *height,
                    periodic_input: *periodic_input,
                    periodic_output: *periodic_output,
                    symmetry: *symmetry,
                    ground: *ground,
                };
                let mut model = OverlappingModel::new(&bitmap, options)?;
                let (image, successful) = self.run_attempts(&mut model);
                (sample.clone(), image, successful)
            }
            Command::Tiled {
                catalog,
                width,
                height,
                periodic,
                subset,
            } => {
                let data = load_catalog(catalog)?;
                let mut model =
                    SimpleTiledModel::new(&data, subset.as_deref(), *width, *height, *periodic)?;
                let (image, successful) = self.run_attempts(&mut model);
                (catalog.clone(), image, successful)
            }
        };

        if let Some(progress) = &self.progress {
            progress.finish(if successful {
                "generation complete"
            } else {
                "finished with contradictions; wrote partial output"
            });
        }

        let output = self
            .cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&input));
        save_png(&image, output)
    }

    /// Drive a model through up to `retries + 1` seeded attempts
    ///
    /// Each attempt runs bounded cycles so progress can be reported; a
    /// contradiction reruns with a derived fresh seed, per the caller-side
    /// rerun policy.
    fn run_attempts<M>(&self, model: &mut M) -> (image::RgbaImage, bool)
    where
        M: Model + Render,
    {
        let budget = self.cli.iterations;

        for attempt in 0..=self.cli.retries {
            model.set_seed(self.cli.seed.wrapping_add(attempt as u64));
            model.clear();

            let finished = if budget == 0 {
                let mut steps = 0;
                loop {
                    if model.advance(PROGRESS_UPDATE_INTERVAL) {
                        break true;
                    }
                    steps += PROGRESS_UPDATE_INTERVAL;
                    if let Some(progress) = &self.progress {
                        progress.update(attempt + 1, steps);
                    }
                }
            } else {
                model.advance(budget)
            };

            if model.is_successful() || !finished {
                return (model.render_current(), model.is_successful());
            }
            // Contradiction: fall through and retry with the next seed
        }

        (model.render_current(), model.is_successful())
    }
}

/// Rendering hook shared by both model types
pub trait Render {
    /// Render the current wave state
    fn render_current(&self) -> image::RgbaImage;
}

impl Render for OverlappingModel {
    fn render_current(&self) -> image::RgbaImage {
        self.render()
    }
}

impl Render for SimpleTiledModel {
    fn render_current(&self) -> image::RgbaImage {
        self.render()
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let output_name = format!("{}{}.png", stem.to_string_lossy(), OUTPUT_SUFFIX);

    input.parent().map_or_else(
        || PathBuf::from(&output_name),
        |parent| parent.join(&output_name),
    )
}
