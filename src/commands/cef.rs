//! build-cef command implementation

use anyhow::Result;
use clap::Args;

use crate::build::cef::build_cef;
use crate::config::Settings;
use crate::utils::terminal;

/// Compile the CEF wrapper library in CEF_DIR
#[derive(Args, Debug)]
pub struct BuildCefCommand {}

impl BuildCefCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        build_cef(&settings)?;
        terminal::print_success("Built libcef_dll_wrapper (Debug and Release)");
        Ok(())
    }
}
