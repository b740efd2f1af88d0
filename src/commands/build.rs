//! Build and rebuild commands

use anyhow::Result;
use clap::Args;

use super::ProfileArgs;
use crate::build::pipeline::Pipeline;
use crate::build::{BuildContext, BuildVariant};
use crate::config::Settings;

/// Compile Doogie and deploy its runtime files
#[derive(Args, Debug)]
pub struct BuildCommand {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

impl BuildCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        let (profile, _) = self.profile.split()?;
        Pipeline::new(BuildContext::new(settings, profile)).build(BuildVariant::App)?;
        Ok(())
    }
}

/// Remove output directories, then build
#[derive(Args, Debug)]
pub struct RebuildCommand {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

impl RebuildCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        let (profile, _) = self.profile.split()?;
        Pipeline::new(BuildContext::new(settings, profile)).rebuild()?;
        Ok(())
    }
}
