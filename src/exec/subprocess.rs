//! Subprocess execution
//!
//! Every external tool goes through [`Invocation`]. Output is streamed
//! straight to the console; there is no timeout and no retry, so a failing
//! command ends the calling step.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::Result;

use crate::error::BuildError;

/// A program, its arguments and an optional working directory
#[derive(Debug, Clone)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

/// Captured result of [`Invocation::output`]
#[derive(Debug)]
pub struct CommandOutput {
    /// Whether the command exited with status 0
    pub success: bool,
    /// Process exit code (`None` when killed by a signal)
    pub exit_code: Option<i32>,
    /// Standard output followed by standard error
    pub combined: String,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the tool's working directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program name for messages
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Shell-like rendering of the command line for verbose output
    pub fn display(&self) -> String {
        let mut line = self.program_name();
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            line.push(' ');
            if arg.contains(' ') {
                line.push('"');
                line.push_str(&arg);
                line.push('"');
            } else {
                line.push_str(&arg);
            }
        }
        line
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn log(&self, verbose: bool) {
        if !verbose {
            return;
        }
        match &self.current_dir {
            Some(dir) => eprintln!("  $ {} (in {})", self.display(), dir.display()),
            None => eprintln!("  $ {}", self.display()),
        }
    }

    /// Run with inherited stdin/stdout/stderr and wait for it to finish
    pub fn run(&self, verbose: bool) -> Result<(), BuildError> {
        self.log(verbose);

        let status = self
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| BuildError::CommandLaunch {
                program: self.program_name(),
                source,
            })?;

        check_status(&self.program_name(), status)
    }

    /// Run with stdout and stderr captured
    ///
    /// A non-zero exit is not an error here; the caller inspects the result.
    pub fn output(&self, verbose: bool) -> Result<CommandOutput, BuildError> {
        self.log(verbose);

        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BuildError::CommandLaunch {
                program: self.program_name(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            combined,
        })
    }
}

fn check_status(program: &str, status: ExitStatus) -> Result<(), BuildError> {
    if status.success() {
        Ok(())
    } else {
        Err(BuildError::CommandFailed {
            program: program.to_string(),
            code: status.code(),
        })
    }
}

/// Locate a program on PATH, failing with a hint-carrying error
pub fn find_program(program: &str, required_for: &str) -> Result<PathBuf, BuildError> {
    which::which(program).map_err(|_| BuildError::missing_tool(program, required_for))
}
