//! uscdefs CLI — look up legal term definitions in US Code titles.
//!
//! Reads USLM title files and prints the terms a section (or any level
//! below it) defines, with the sentence each definition comes from.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
