//! External process execution

pub mod subprocess;

pub use subprocess::{find_program, Invocation};
