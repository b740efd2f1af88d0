//! Invocation configuration
//!
//! All settings come from command-line flags, with environment-variable
//! fallbacks resolved by clap. There is no configuration file.

mod settings;

pub use settings::{Settings, CEF_DIR_VAR, DEPOT_TOOLS_DIR_VAR, QMAKE_VAR};
