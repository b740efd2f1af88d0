//! Command implementations
//!
//! Each command module provides a clap-derived struct and an execute method
//! taking the resolved [`Settings`](crate::config::Settings).

pub mod bench;
pub mod build;
pub mod cef;
pub mod clean;
pub mod lint;
pub mod package;
pub mod run;
pub mod test;

use clap::Args;

use crate::build::Profile;
use crate::error::BuildError;

/// Optional profile token followed by pass-through arguments
#[derive(Args, Debug, Default, Clone)]
pub struct ProfileArgs {
    /// Build profile (debug or release, default debug), then arguments for the launched program
    #[arg(
        value_name = "PROFILE [ARGS]",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub tokens: Vec<String>,
}

impl ProfileArgs {
    /// Selected profile and the remaining arguments
    pub fn split(&self) -> Result<(Profile, &[String]), BuildError> {
        split_profile(&self.tokens)
    }
}

/// Take the profile from the first token unless it is a `--` option
///
/// Without a profile token every token is passed through.
pub fn split_profile(tokens: &[String]) -> Result<(Profile, &[String]), BuildError> {
    match tokens.split_first() {
        Some((first, rest)) if !first.starts_with("--") => Ok((first.parse()?, rest)),
        _ => Ok((Profile::default(), tokens)),
    }
}
