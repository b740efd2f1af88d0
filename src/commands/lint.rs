//! Lint command implementation

use anyhow::Result;
use clap::Args;

use crate::build::lint::run_lint;
use crate::config::Settings;

/// Check C++ sources with cpplint
#[derive(Args, Debug)]
pub struct LintCommand {}

impl LintCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        run_lint(&settings)
    }
}
