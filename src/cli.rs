//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::commands::{
    bench::BenchmarkCommand,
    build::{BuildCommand, RebuildCommand},
    cef::BuildCefCommand,
    clean::CleanCommand,
    lint::LintCommand,
    package::PackageCommand,
    run::{RerunCommand, RunCommand},
    test::UnitTestCommand,
};
use crate::config::{Settings, CEF_DIR_VAR, DEPOT_TOOLS_DIR_VAR, QMAKE_VAR};
use crate::platform::Platform;

/// Doogie build tool
///
/// Drives qmake and the native toolchain, deploys Qt and CEF runtime files
/// next to the binary, and packages the result.
#[derive(Parser, Debug)]
#[command(name = "doogie-build")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Extracted CEF binary distribution
    #[arg(long, global = true, env = CEF_DIR_VAR, value_name = "DIR")]
    pub cef_dir: Option<PathBuf>,

    /// Chromium depot_tools checkout providing cpplint.py
    #[arg(long, global = true, env = DEPOT_TOOLS_DIR_VAR, value_name = "DIR")]
    pub depot_tools_dir: Option<PathBuf>,

    /// qmake executable to use instead of the one on PATH
    #[arg(long, global = true, env = QMAKE_VAR, value_name = "PATH")]
    pub qmake: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, then launch the browser
    Run(RunCommand),

    /// Clean, then build and launch the browser
    Rerun(RerunCommand),

    /// Remove the debug and release output directories
    Clean(CleanCommand),

    /// Clean, then build
    Rebuild(RebuildCommand),

    /// Compile and deploy runtime files
    Build(BuildCommand),

    /// Archive a built output directory
    Package(PackageCommand),

    /// Compile the CEF wrapper library
    #[command(name = "build-cef")]
    BuildCef(BuildCefCommand),

    /// Check C++ sources with cpplint
    Lint(LintCommand),

    /// Build and run the unit tests
    #[command(name = "unit-test")]
    UnitTest(UnitTestCommand),

    /// Build and run the benchmarks
    Benchmark(BenchmarkCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let platform = Platform::current()?;
        let project_root =
            std::env::current_dir().context("Failed to get current working directory")?;

        let mut settings = Settings::new(project_root, platform, self.verbose);
        settings.cef_dir = self.cef_dir;
        settings.depot_tools_dir = self.depot_tools_dir;
        settings.qmake = self.qmake;

        match self.command {
            Commands::Run(cmd) => cmd.execute(settings),
            Commands::Rerun(cmd) => cmd.execute(settings),
            Commands::Clean(cmd) => cmd.execute(settings),
            Commands::Rebuild(cmd) => cmd.execute(settings),
            Commands::Build(cmd) => cmd.execute(settings),
            Commands::Package(cmd) => cmd.execute(settings),
            Commands::BuildCef(cmd) => cmd.execute(settings),
            Commands::Lint(cmd) => cmd.execute(settings),
            Commands::UnitTest(cmd) => cmd.execute(settings),
            Commands::Benchmark(cmd) => cmd.execute(settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_pass_through() {
        let cli = Cli::try_parse_from([
            "doogie-build",
            "run",
            "release",
            "--remote-debugging-port=9222",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(cmd) => {
                assert_eq!(cmd.profile.tokens, ["release", "--remote-debugging-port=9222"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_hyphenated_commands() {
        assert!(matches!(
            Cli::try_parse_from(["doogie-build", "build-cef"]).unwrap().command,
            Commands::BuildCef(_)
        ));
        assert!(matches!(
            Cli::try_parse_from(["doogie-build", "unit-test", "release"]).unwrap().command,
            Commands::UnitTest(_)
        ));
    }

    #[test]
    fn test_unrecognized_command() {
        assert!(Cli::try_parse_from(["doogie-build", "foobar"]).is_err());
    }
}
