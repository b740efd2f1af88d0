//! Clean command implementation

use anyhow::Result;
use clap::Args;

use crate::build::pipeline::Pipeline;
use crate::build::{BuildContext, Profile};
use crate::config::Settings;
use crate::utils::terminal;

/// Remove the debug and release output directories
#[derive(Args, Debug)]
pub struct CleanCommand {}

impl CleanCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        // Both profiles are removed, so the context profile is irrelevant
        Pipeline::new(BuildContext::new(settings, Profile::default())).clean()?;
        terminal::print_success("Cleaned debug and release outputs");
        Ok(())
    }
}
