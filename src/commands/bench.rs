//! Benchmark command implementation

use anyhow::Result;
use clap::Args;

use super::ProfileArgs;
use crate::build::pipeline::Pipeline;
use crate::build::BuildContext;
use crate::config::Settings;

/// Build and run the benchmarks
#[derive(Args, Debug)]
pub struct BenchmarkCommand {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

impl BenchmarkCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        let (profile, _) = self.profile.split()?;
        Pipeline::new(BuildContext::new(settings, profile)).benchmark()
    }
}
