//! Package command implementation

use anyhow::Result;
use clap::Args;

use super::ProfileArgs;
use crate::build::pipeline::Pipeline;
use crate::build::BuildContext;
use crate::config::Settings;

/// Archive a built output directory for distribution
#[derive(Args, Debug)]
pub struct PackageCommand {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

impl PackageCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        let (profile, _) = self.profile.split()?;
        Pipeline::new(BuildContext::new(settings, profile)).package()?;
        Ok(())
    }
}
