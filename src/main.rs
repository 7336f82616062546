//! CLI entry point for wave function collapse generation

use clap::Parser;
use wavetile::io::cli::{Cli, Runner};

fn main() -> wavetile::Result<()> {
    let cli = Cli::parse();
    let mut runner = Runner::new(cli);
    runner.process()
}
