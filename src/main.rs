//! doogie-build - build, deploy and package the Doogie browser
//!
//! ## Architecture
//!
//! ```text
//! cli → commands/ → build/pipeline → qmake/make, deploy → exec/
//! ```
//!
//! Any failure prints the error chain and exits with status 2.

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod platform;
mod utils;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        error::display_with_hints(&err);
        std::process::exit(2);
    }
}
