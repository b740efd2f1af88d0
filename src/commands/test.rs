//! Unit test command implementation

use anyhow::Result;
use clap::Args;

use super::ProfileArgs;
use crate::build::pipeline::Pipeline;
use crate::build::BuildContext;
use crate::config::Settings;

/// Build and run the Qt unit tests
#[derive(Args, Debug)]
pub struct UnitTestCommand {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

impl UnitTestCommand {
    pub fn execute(self, settings: Settings) -> Result<()> {
        let (profile, _) = self.profile.split()?;
        Pipeline::new(BuildContext::new(settings, profile)).unit_test()
    }
}
