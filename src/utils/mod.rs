//! Shared helpers for paths and terminal output

pub mod paths;
pub mod terminal;
