//! Run and rerun commands

use anyhow::Result;
use clap::Args;

use super::ProfileArgs;
use crate::build::pipeline::Pipeline;
use crate::build::BuildContext;
use crate::config::Settings;

/// Build, then launch the browser
#[derive(Args, Debug)]
pub struct RunCommand {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

impl RunCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        let (profile, args) = self.profile.split()?;
        Pipeline::new(BuildContext::new(settings, profile)).run(args)
    }
}

/// Remove output directories, then build and launch the browser
#[derive(Args, Debug)]
pub struct RerunCommand {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

impl RerunCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        let (profile, args) = self.profile.split()?;
        Pipeline::new(BuildContext::new(settings, profile)).rerun(args)
    }
}
